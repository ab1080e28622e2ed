//! Interleave order-independence and failure-path tests (end-to-end
//! scenario 3).

use std::sync::Arc;

use rng_validate_core::core::grammar_walker::GrammarWalker;
use rng_validate_core::core::name_class::NameClass;
use rng_validate_core::core::name_resolver::ExpandedName;
use rng_validate_core::core::pattern::Pattern;
use rng_validate_core::event::Event;

fn name(local: &str) -> ExpandedName {
    ExpandedName::new("", local)
}

fn elem(local: &str) -> Arc<Pattern> {
    Arc::new(Pattern::Element(
        NameClass::Name {
            ns: "".into(),
            local: local.into(),
        },
        Arc::new(Pattern::Empty),
    ))
}

fn schema() -> Arc<Pattern> {
    Arc::new(Pattern::Element(
        NameClass::Name {
            ns: "".into(),
            local: "foo".into(),
        },
        Arc::new(Pattern::Interleave(elem("a"), elem("b"))),
    ))
}

#[test]
fn interleave_accepts_either_order() {
    let mut gw = GrammarWalker::new(schema());
    gw.fire_event(Event::EnterStartTag(name("foo")));
    gw.fire_event(Event::LeaveStartTag);
    assert!(gw.fire_event(Event::EnterStartTag(name("b"))).is_ok());
    gw.fire_event(Event::LeaveStartTag);
    assert!(gw.fire_event(Event::EndTag).is_ok());
    assert!(gw.fire_event(Event::EnterStartTag(name("a"))).is_ok());
    gw.fire_event(Event::LeaveStartTag);
    assert!(gw.fire_event(Event::EndTag).is_ok());
    assert!(gw.fire_event(Event::EndTag).is_ok());
    assert!(gw.is_complete());
}

#[test]
fn interleave_reports_missing_sibling_at_end_tag() {
    let mut gw = GrammarWalker::new(schema());
    gw.fire_event(Event::EnterStartTag(name("foo")));
    gw.fire_event(Event::LeaveStartTag);
    gw.fire_event(Event::EnterStartTag(name("a")));
    gw.fire_event(Event::LeaveStartTag);
    gw.fire_event(Event::EndTag);
    let result = gw.fire_event(Event::EndTag);
    assert!(!result.is_ok());
}
