//! Hand-drives a `GrammarWalker` over a small instance document, without
//! an XML parser: events are constructed directly, the way a real caller
//! would after running its own parser and namespace resolution.
//!
//! Run with `cargo run --example validate_document` (once this directory
//! is wired up as a `[[example]]` in `Cargo.toml`).

use std::sync::Arc;

use rng_validate_core::core::grammar_walker::GrammarWalker;
use rng_validate_core::core::name_class::NameClass;
use rng_validate_core::core::name_resolver::ExpandedName;
use rng_validate_core::core::pattern::Pattern;
use rng_validate_core::event::{Event, FireEventResult};

fn elem(local: &str, content: Arc<Pattern>) -> Arc<Pattern> {
    Arc::new(Pattern::Element(
        NameClass::Name {
            ns: "".into(),
            local: local.into(),
        },
        content,
    ))
}

fn name(local: &str) -> ExpandedName {
    ExpandedName::new("", local)
}

/// `element person { attribute name { text }, element email { text }* }`
fn person_schema() -> Arc<Pattern> {
    elem(
        "person",
        Arc::new(Pattern::Group(
            Arc::new(Pattern::Attribute(
                NameClass::Name {
                    ns: "".into(),
                    local: "name".into(),
                },
                Arc::new(Pattern::Text),
            )),
            Arc::new(Pattern::Choice(
                Arc::new(Pattern::Empty),
                Arc::new(Pattern::OneOrMore(elem("email", Arc::new(Pattern::Text)))),
            )),
        )),
    )
}

fn main() {
    env_logger::init();

    let mut gw = GrammarWalker::new(person_schema());
    let events = [
        Event::EnterStartTag(name("person")),
        Event::Attribute(name("name"), "Ada Lovelace".into()),
        Event::LeaveStartTag,
        Event::EnterStartTag(name("email")),
        Event::LeaveStartTag,
        Event::Text("ada@example.org".into()),
        Event::EndTag,
        Event::EndTag,
    ];

    for event in events {
        match gw.fire_event(event.clone()) {
            FireEventResult::Ok => log::debug!("{:?} accepted", event),
            FireEventResult::Invalid(errors) => {
                for error in errors {
                    eprintln!("validation error: {}", error);
                }
            }
        }
    }

    if gw.is_complete() {
        println!("document is valid");
    } else {
        eprintln!("document ended in an incomplete state");
    }
}
