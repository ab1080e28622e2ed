//! Integration tests for the JSON (v3) schema loader, exercised purely
//! through the public API (`loader::load` + `GrammarWalker`), as opposed
//! to the constructor-table unit tests living alongside the loader itself.

use rng_validate_core::core::grammar_walker::GrammarWalker;
use rng_validate_core::core::name_resolver::ExpandedName;
use rng_validate_core::event::Event;
use rng_validate_core::loader::{load, LoaderOptions};

fn name(local: &str) -> ExpandedName {
    ExpandedName::new("", local)
}

#[test]
fn loads_a_schema_with_a_required_attribute_and_paths_included() {
    // option flags 0: paths are included, so every node array carries its
    // path string right after the ctor.
    let json = r#"{
        "v": 3,
        "o": 0,
        "d": [3, "/", [5, "/", "", "foo"],
            [4, "/foo/@a", [5, "/foo/@a", "", "a"], [16, "/foo/@a/text"]]
        ]
    }"#;
    let pattern = load(json, &LoaderOptions::default()).unwrap();

    let mut ok = GrammarWalker::new(pattern.clone());
    ok.fire_event(Event::EnterStartTag(name("foo")));
    assert!(ok
        .fire_event(Event::Attribute(name("a"), "value".into()))
        .is_ok());
    assert!(ok.fire_event(Event::LeaveStartTag).is_ok());
    assert!(ok.fire_event(Event::EndTag).is_ok());

    let mut missing = GrammarWalker::new(pattern);
    missing.fire_event(Event::EnterStartTag(name("foo")));
    assert!(!missing.fire_event(Event::LeaveStartTag).is_ok());
}

#[test]
fn string_form_ctors_and_numeric_ctors_build_the_same_tree() {
    let numeric = r#"{ "v": 3, "o": 1, "d": [0, [], [3, [5, "", "foo"], [16]]] }"#;
    let verbose = r#"{
        "v": 3, "o": 1,
        "d": ["Grammar", [], ["Element", ["Name", "", "foo"], ["Text"]]]
    }"#;

    for json in [numeric, verbose] {
        let pattern = load(json, &LoaderOptions::default()).unwrap();
        let mut gw = GrammarWalker::new(pattern);
        gw.fire_event(Event::EnterStartTag(name("foo")));
        gw.fire_event(Event::LeaveStartTag);
        assert!(gw.fire_event(Event::Text("hello".into())).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.is_complete());
    }
}

#[test]
fn rejects_a_format_version_other_than_three() {
    let json = r#"{ "v": 1, "o": 0, "d": [16] }"#;
    assert!(load(json, &LoaderOptions::default()).is_err());
}
