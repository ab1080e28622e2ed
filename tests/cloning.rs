//! Walker-cloning and pattern-identity properties (see end-to-end
//! invariants: cloning preserves behavior; `Choice(a, NotAllowed)` behaves
//! like `a`; `Group(a, Empty)` behaves like `a`).

use std::sync::Arc;

use rng_validate_core::core::name_class::NameClass;
use rng_validate_core::core::name_resolver::ExpandedName;
use rng_validate_core::core::pattern::Pattern;
use rng_validate_core::core::walker::Walker;
use rng_validate_core::event::FireEventResult;

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

#[test]
fn cloned_walkers_behave_identically_to_the_original() {
    let pattern = Arc::new(Pattern::OneOrMore(elem("item")));
    let mut original = Walker::from_pattern(&pattern);
    let mut clone = original.clone();

    for _ in 0..3 {
        let a = original.fire_start_tag(&name("item"), "/");
        let b = clone.fire_start_tag(&name("item"), "/");
        assert_eq!(a.is_ok(), b.is_ok());
    }
    assert_eq!(original.accepts_end().is_ok(), clone.accepts_end().is_ok());
}

#[test]
fn choice_with_not_allowed_branch_behaves_like_its_other_branch() {
    let choice = Arc::new(Pattern::Choice(
        elem("a"),
        Pattern::not_allowed("unreachable"),
    ));
    let mut w = Walker::from_pattern(&choice);
    assert!(w.fire_start_tag(&name("a"), "/").is_ok());
    assert!(w.accepts_end().is_ok());

    let mut rejected = Walker::from_pattern(&choice);
    assert!(matches!(
        rejected.fire_start_tag(&name("b"), "/"),
        Err(_)
    ));
}

#[test]
fn group_with_empty_behaves_like_its_other_side() {
    let group = Arc::new(Pattern::Group(elem("a"), Pattern::empty()));
    let mut w = Walker::from_pattern(&group);
    assert!(w.fire_start_tag(&name("a"), "/").is_ok());
    assert!(w.accepts_end().is_ok());
}

#[test]
fn interleave_is_commutative() {
    let ab = Arc::new(Pattern::Interleave(elem("a"), elem("b")));
    let ba = Arc::new(Pattern::Interleave(elem("b"), elem("a")));

    for pattern in [ab, ba] {
        let mut w = Walker::from_pattern(&pattern);
        assert!(matches!(
            w.fire_start_tag(&name("b"), "/"),
            Ok(_)
        ));
        assert!(matches!(
            w.fire_start_tag(&name("a"), "/"),
            Ok(_)
        ));
        assert!(w.accepts_end().is_ok());
    }
}

#[test]
fn fire_text_on_a_dead_walker_stays_invalid() {
    let mut w = Walker::Dead {
        why: "unreachable".into(),
    };
    match w.fire_text("anything", "/") {
        FireEventResult::Invalid(_) => {}
        FireEventResult::Ok => panic!("a dead walker must never accept an event"),
    }
}
