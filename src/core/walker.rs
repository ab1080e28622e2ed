//! Mutable validation state: one [`Walker`] per content model currently
//! being matched, advanced event by event.
//!
//! A `Walker` only ever answers three questions about the content model it
//! wraps: can a child element with this name open here (`fire_start_tag`,
//! which hands back a *fresh* `Walker` for that child's own content —
//! callers push it onto their own stack, this tree never stores it),
//! can this text appear here (`fire_text`), and is it legal to stop here
//! (`accepts_end`). Nesting is therefore the caller's concern, not this
//! tree's: [`crate::core::grammar_walker::GrammarWalker`] keeps an explicit
//! stack of open elements' `Walker`s, which is what actually lets two
//! elements open and close without the pattern tree needing to remember
//! which one is "currently inside" which.
//!
//! `Choice` and `Interleave` are the two constructs that need to explore
//! more than one possible next state; they do this by cloning their child
//! walkers rather than the whole tree, committing the clone only once it
//! proves the event was acceptable.

use std::sync::Arc;

use crate::core::datatype::{self, Datatype};
use crate::core::errors::ValidationError;
use crate::core::name_class::NameClass;
use crate::core::name_resolver::ExpandedName;
use crate::core::pattern::Pattern;
use crate::event::{EndResult, FireEventResult, PossibleEvents};

#[derive(Debug, Clone)]
pub enum Walker {
    /// Nothing more is required or permitted from this position.
    Accepting,
    /// Permanently dead: every event and `end()` will fail from here on.
    Dead { why: String },
    /// `Pattern::Text` / an as-yet-unconsumed `Pattern::Value` or
    /// `Pattern::Data`: waiting for exactly one `Text` event.
    AwaitingText { pattern: Arc<Pattern> },
    List { inner: Box<Walker> },
    Group { left: Box<Walker>, right: Box<Walker> },
    Interleave { left: Box<Walker>, right: Box<Walker> },
    /// Still-live alternative branches. Collapses as events eliminate
    /// branches; `fire_*` returns an error once `branches` would go empty.
    Choice { branches: Vec<Walker> },
    OneOrMore {
        /// The walker for the instance currently being consumed.
        current: Box<Walker>,
        /// The original pattern, used to start a fresh repetition once
        /// `current` has nothing left to give.
        original: Arc<Pattern>,
        /// Whether at least one repetition has already completed.
        satisfied: bool,
    },
    /// A single, not-yet-opened element slot. Matching its start tag
    /// consumes it (the walker transitions to `Accepting`) and hands the
    /// caller a fresh `Walker` for the child's own content/attributes.
    Element {
        name_class: NameClass,
        content: Arc<Pattern>,
    },
    Attribute {
        name_class: NameClass,
        content: Arc<Pattern>,
        consumed: bool,
    },
    Ref {
        inner: Option<Box<Walker>>,
        target: Arc<Pattern>,
    },
}

impl Walker {
    pub fn from_pattern(pattern: &Arc<Pattern>) -> Walker {
        match pattern.as_ref() {
            Pattern::Empty => Walker::Accepting,
            Pattern::NotAllowed { why } => Walker::Dead { why: why.clone() },
            Pattern::Text => Walker::AwaitingText {
                pattern: pattern.clone(),
            },
            Pattern::Value { .. } | Pattern::Data { .. } => Walker::AwaitingText {
                pattern: pattern.clone(),
            },
            Pattern::List(inner) => Walker::List {
                inner: Box::new(Walker::from_pattern(inner)),
            },
            Pattern::Group(a, b) => Walker::Group {
                left: Box::new(Walker::from_pattern(a)),
                right: Box::new(Walker::from_pattern(b)),
            },
            Pattern::Interleave(a, b) => Walker::Interleave {
                left: Box::new(Walker::from_pattern(a)),
                right: Box::new(Walker::from_pattern(b)),
            },
            Pattern::Choice(a, b) => Walker::Choice {
                branches: vec![Walker::from_pattern(a), Walker::from_pattern(b)],
            },
            Pattern::OneOrMore(inner) => Walker::OneOrMore {
                current: Box::new(Walker::from_pattern(inner)),
                original: inner.clone(),
                satisfied: false,
            },
            Pattern::Element(nc, content) => Walker::Element {
                name_class: nc.clone(),
                content: content.clone(),
            },
            Pattern::Attribute(nc, content) => Walker::Attribute {
                name_class: nc.clone(),
                content: content.clone(),
                consumed: false,
            },
            Pattern::Ref { target, .. } => Walker::Ref {
                inner: None,
                target: target
                    .get()
                    .cloned()
                    .expect("ref target resolved before walker construction"),
            },
        }
    }

    /// Whether ending the content this walker models is legal here (no
    /// further events).
    pub fn accepts_end(&self) -> EndResult {
        let ok = match self {
            Walker::Accepting => true,
            Walker::Dead { .. } => false,
            Walker::AwaitingText { pattern } => pattern.has_empty_pattern(),
            Walker::List { .. } => false,
            Walker::Group { left, right } => {
                left.accepts_end().is_ok() && right.accepts_end().is_ok()
            }
            Walker::Interleave { left, right } => {
                left.accepts_end().is_ok() && right.accepts_end().is_ok()
            }
            Walker::Choice { branches } => branches.iter().any(|b| b.accepts_end().is_ok()),
            Walker::OneOrMore {
                current,
                satisfied,
                ..
            } => *satisfied || current.accepts_end().is_ok(),
            Walker::Element { .. } => false,
            Walker::Attribute { consumed, .. } => *consumed,
            Walker::Ref { inner, target, .. } => match inner {
                Some(w) => w.accepts_end().is_ok(),
                None => target.has_empty_pattern(),
            },
        };
        if ok {
            EndResult::Ok
        } else {
            EndResult::Invalid(vec![ValidationError::generic(
                "",
                "content ended but more was required",
            )])
        }
    }

    /// Fire a `Text` content event.
    pub fn fire_text(&mut self, text: &str, path: &str) -> FireEventResult {
        match self {
            Walker::AwaitingText { pattern } => fire_text_leaf(self_pattern(pattern), text, path, self),
            Walker::List { inner } => {
                for token in text.split_whitespace() {
                    match inner.fire_text(token, path) {
                        FireEventResult::Ok => {}
                        invalid @ FireEventResult::Invalid(_) => return invalid,
                    }
                }
                match inner.accepts_end() {
                    EndResult::Ok => {
                        *self = Walker::Accepting;
                        FireEventResult::Ok
                    }
                    EndResult::Invalid(errs) => FireEventResult::Invalid(errs),
                }
            }
            Walker::Group { left, right } => {
                if left.accepts_end().is_ok() {
                    right.fire_text(text, path)
                } else {
                    left.fire_text(text, path)
                }
            }
            Walker::Interleave { left, right } => {
                let mut try_left = left.clone();
                if try_left.fire_text(text, path).is_ok() {
                    **left = try_left;
                    FireEventResult::Ok
                } else {
                    right.fire_text(text, path)
                }
            }
            Walker::Choice { branches } => fire_in_branches(branches, |w| w.fire_text(text, path)),
            Walker::OneOrMore {
                current,
                original,
                satisfied,
            } => match current.fire_text(text, path) {
                FireEventResult::Ok => {
                    *satisfied = true;
                    FireEventResult::Ok
                }
                FireEventResult::Invalid(errs) => {
                    let mut fresh = Walker::from_pattern(original);
                    let result = fresh.fire_text(text, path);
                    if result.is_ok() {
                        *current = Box::new(fresh);
                        *satisfied = true;
                        result
                    } else {
                        FireEventResult::Invalid(errs)
                    }
                }
            },
            Walker::Ref { inner, target } => {
                let walker = inner.get_or_insert_with(|| Box::new(Walker::from_pattern(target)));
                walker.fire_text(text, path)
            }
            Walker::Dead { why } => {
                FireEventResult::Invalid(vec![ValidationError::generic(path, why.clone())])
            }
            Walker::Accepting | Walker::Element { .. } | Walker::Attribute { .. } => {
                FireEventResult::Invalid(vec![ValidationError::generic(
                    path,
                    "text is not permitted here",
                )])
            }
        }
    }

    /// Attempt to open a child element named `name` here. On success,
    /// returns the fresh `Walker` for that child's own
    /// attributes/content — the caller (the element/grammar walker's open
    /// stack) owns it from here; this tree keeps no reference to it.
    pub fn fire_start_tag(&mut self, name: &ExpandedName, path: &str) -> Result<Walker, Vec<ValidationError>> {
        match self {
            Walker::Element { name_class, content } => {
                if name_class.matches(name) {
                    let child = Walker::from_pattern(content);
                    *self = Walker::Accepting;
                    Ok(child)
                } else {
                    Err(vec![ValidationError::ElementNameError {
                        path: path.to_string(),
                        actual: format!("{{{}}}{}", name.ns, name.local),
                    }])
                }
            }
            Walker::Group { left, right } => {
                let mut try_left = left.clone();
                match try_left.fire_start_tag(name, path) {
                    Ok(child) => {
                        **left = try_left;
                        Ok(child)
                    }
                    Err(left_err) => {
                        if left.accepts_end().is_ok() {
                            right.fire_start_tag(name, path)
                        } else {
                            Err(left_err)
                        }
                    }
                }
            }
            Walker::Interleave { left, right } => {
                let mut try_left = left.clone();
                match try_left.fire_start_tag(name, path) {
                    Ok(child) => {
                        **left = try_left;
                        Ok(child)
                    }
                    Err(left_err) => {
                        let mut try_right = right.clone();
                        match try_right.fire_start_tag(name, path) {
                            Ok(child) => {
                                **right = try_right;
                                Ok(child)
                            }
                            Err(_) => Err(left_err),
                        }
                    }
                }
            }
            Walker::Choice { branches } => {
                let mut last_err = None;
                for branch in branches.iter() {
                    let mut clone = branch.clone();
                    match clone.fire_start_tag(name, path) {
                        Ok(child) => {
                            // A start tag can only ever belong to one
                            // branch; collapse to it so a sibling branch's
                            // leftover element slot can't also admit this
                            // (or a later) start tag.
                            *branches = vec![clone];
                            return Ok(child);
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(last_err.unwrap_or_else(|| {
                    vec![ValidationError::ChoiceError {
                        path: path.to_string(),
                        alternatives: vec![],
                    }]
                }))
            }
            Walker::OneOrMore {
                current,
                original,
                satisfied,
            } => {
                let mut try_current = current.clone();
                match try_current.fire_start_tag(name, path) {
                    Ok(child) => {
                        *current = try_current;
                        *satisfied = true;
                        Ok(child)
                    }
                    Err(e) => {
                        let mut fresh = Walker::from_pattern(original);
                        match fresh.fire_start_tag(name, path) {
                            Ok(child) => {
                                *current = Box::new(fresh);
                                *satisfied = true;
                                Ok(child)
                            }
                            Err(_) => Err(e),
                        }
                    }
                }
            }
            Walker::Ref { inner, target } => {
                let walker = inner.get_or_insert_with(|| Box::new(Walker::from_pattern(target)));
                walker.fire_start_tag(name, path)
            }
            Walker::Dead { why } => Err(vec![ValidationError::generic(path, why.clone())]),
            Walker::Accepting
            | Walker::AwaitingText { .. }
            | Walker::List { .. }
            | Walker::Attribute { .. } => Err(vec![ValidationError::ElementNameError {
                path: path.to_string(),
                actual: format!("{{{}}}{}", name.ns, name.local),
            }]),
        }
    }

    /// Fire an `Attribute(name, value)` event. Never needs cloning for
    /// `Group`/`Interleave`: an attribute match is atomic, and a failed
    /// attempt never mutates state (see `Walker::Attribute`'s branch).
    pub fn fire_attribute(
        &mut self,
        name: &ExpandedName,
        value: &str,
        path: &str,
    ) -> Result<(), Vec<ValidationError>> {
        match self {
            Walker::Attribute {
                name_class,
                content,
                consumed,
            } => {
                if *consumed {
                    return Err(vec![ValidationError::generic(
                        path,
                        "attribute already consumed",
                    )]);
                }
                if !name_class.matches(name) {
                    return Err(vec![ValidationError::AttributeNameError {
                        path: path.to_string(),
                        actual: format!("{{{}}}{}", name.ns, name.local),
                    }]);
                }
                let mut value_walker = Walker::from_pattern(content);
                match value_walker.fire_text(value, path) {
                    FireEventResult::Ok => {
                        if value_walker.accepts_end().is_ok() {
                            *consumed = true;
                            Ok(())
                        } else {
                            Err(vec![ValidationError::AttributeValueError {
                                path: path.to_string(),
                                reason: "attribute value is incomplete".to_string(),
                            }])
                        }
                    }
                    FireEventResult::Invalid(errs) => Err(errs),
                }
            }
            Walker::Group { left, right } | Walker::Interleave { left, right } => {
                match left.fire_attribute(name, value, path) {
                    Ok(()) => Ok(()),
                    Err(_) => right.fire_attribute(name, value, path),
                }
            }
            Walker::Choice { branches } => {
                let mut survivors = Vec::new();
                let mut last_err = None;
                for branch in branches.iter() {
                    let mut clone = branch.clone();
                    match clone.fire_attribute(name, value, path) {
                        Ok(()) => survivors.push(clone),
                        Err(e) => last_err = Some(e),
                    }
                }
                if survivors.is_empty() {
                    Err(last_err.unwrap_or_else(|| {
                        vec![ValidationError::AttributeNameError {
                            path: path.to_string(),
                            actual: format!("{{{}}}{}", name.ns, name.local),
                        }]
                    }))
                } else {
                    *branches = survivors;
                    Ok(())
                }
            }
            Walker::OneOrMore { current, .. } => current.fire_attribute(name, value, path),
            Walker::Ref { inner, target } => {
                let walker = inner.get_or_insert_with(|| Box::new(Walker::from_pattern(target)));
                walker.fire_attribute(name, value, path)
            }
            _ => Err(vec![ValidationError::AttributeNameError {
                path: path.to_string(),
                actual: format!("{{{}}}{}", name.ns, name.local),
            }]),
        }
    }

    /// The current acceptance set for content events: which child element
    /// names (if any), whether `Text`, and whether ending here is legal.
    pub fn possible(&self) -> PossibleEvents {
        let mut acc = PossibleEvents {
            end: self.accepts_end().is_ok(),
            ..Default::default()
        };
        self.collect_possible_start(&mut acc);
        acc
    }

    fn collect_possible_start(&self, acc: &mut PossibleEvents) {
        match self {
            Walker::Accepting | Walker::Dead { .. } | Walker::Attribute { .. } => {}
            Walker::AwaitingText { .. } | Walker::List { .. } => acc.text = true,
            Walker::Group { left, right } => {
                left.collect_possible_start(acc);
                if left.accepts_end().is_ok() {
                    right.collect_possible_start(acc);
                }
            }
            Walker::Interleave { left, right } => {
                left.collect_possible_start(acc);
                right.collect_possible_start(acc);
            }
            Walker::Choice { branches } => {
                for b in branches {
                    b.collect_possible_start(acc);
                }
            }
            Walker::OneOrMore {
                current,
                original,
                satisfied,
            } => {
                current.collect_possible_start(acc);
                if *satisfied || current.accepts_end().is_ok() {
                    Walker::from_pattern(original).collect_possible_start(acc);
                }
            }
            Walker::Element { name_class, .. } => match name_class.to_enumeration() {
                Some(names) => acc.names.extend(names),
                None => acc.open_ended = true,
            },
            Walker::Ref { inner, target } => match inner {
                Some(w) => w.collect_possible_start(acc),
                None => Walker::from_pattern(target).collect_possible_start(acc),
            },
        }
    }

    /// The current acceptance set for attribute events, valid only while an
    /// element is still in its attribute phase.
    pub fn possible_attributes(&self) -> PossibleEvents {
        let mut acc = PossibleEvents {
            end: self.accepts_end_attributes(),
            ..Default::default()
        };
        self.collect_possible_attributes(&mut acc);
        acc
    }

    fn collect_possible_attributes(&self, acc: &mut PossibleEvents) {
        match self {
            Walker::Attribute {
                name_class,
                consumed,
                ..
            } => {
                if !*consumed {
                    match name_class.to_enumeration() {
                        Some(names) => acc.names.extend(names),
                        None => acc.open_ended = true,
                    }
                }
            }
            Walker::Group { left, right } | Walker::Interleave { left, right } => {
                left.collect_possible_attributes(acc);
                right.collect_possible_attributes(acc);
            }
            Walker::Choice { branches } => {
                for b in branches {
                    b.collect_possible_attributes(acc);
                }
            }
            Walker::OneOrMore { current, .. } => current.collect_possible_attributes(acc),
            Walker::Ref { inner, target } => match inner {
                Some(w) => w.collect_possible_attributes(acc),
                None => Walker::from_pattern(target).collect_possible_attributes(acc),
            },
            _ => {}
        }
    }

    /// Whether `end_attributes` (no more attributes) is legal here: every
    /// attribute pattern along every still-live path must already be
    /// consumed, or be optional (a `Choice` with `Empty`, per the
    /// simplified form).
    pub fn accepts_end_attributes(&self) -> bool {
        match self {
            Walker::Attribute { consumed, .. } => *consumed,
            Walker::Group { left, right } | Walker::Interleave { left, right } => {
                left.accepts_end_attributes() && right.accepts_end_attributes()
            }
            Walker::Choice { branches } => branches.iter().any(|b| b.accepts_end_attributes()),
            Walker::OneOrMore {
                current, satisfied, ..
            } => *satisfied || current.accepts_end_attributes(),
            Walker::Ref { inner, target } => match inner {
                Some(w) => w.accepts_end_attributes(),
                None => !target.has_attrs(),
            },
            _ => true,
        }
    }
}

fn self_pattern(pattern: &Arc<Pattern>) -> Arc<Pattern> {
    pattern.clone()
}

fn fire_text_leaf(
    pattern: Arc<Pattern>,
    text: &str,
    path: &str,
    walker: &mut Walker,
) -> FireEventResult {
    match pattern.as_ref() {
        Pattern::Text => {
            *walker = Walker::Accepting;
            FireEventResult::Ok
        }
        Pattern::Value {
            datatype: dt,
            value,
        } => match datatype::lookup(&dt.library, &dt.name) {
            Some(ty) => {
                let parsed = ty.parse_value(&dt.params, text);
                let expected = ty.parse_value(&dt.params, value);
                match (parsed, expected) {
                    (Ok(p), Ok(e)) if ty.equal(&dt.params, &p, &e) => {
                        *walker = Walker::Accepting;
                        FireEventResult::Ok
                    }
                    _ => {
                        *walker = Walker::Dead {
                            why: format!("value did not equal '{}'", value),
                        };
                        FireEventResult::Invalid(vec![ValidationError::AttributeValueError {
                            path: path.to_string(),
                            reason: format!("expected the value '{}'", value),
                        }])
                    }
                }
            }
            None => FireEventResult::Invalid(vec![ValidationError::generic(
                path,
                format!("unknown datatype '{}:{}'", dt.library, dt.name),
            )]),
        },
        Pattern::Data {
            datatype: dt,
            except,
        } => match datatype::lookup(&dt.library, &dt.name) {
            Some(ty) => match ty.parse_value(&dt.params, text) {
                Ok(value) => {
                    if let Some(reason) = ty.disallows(&dt.params, &value) {
                        *walker = Walker::Dead {
                            why: reason.clone(),
                        };
                        FireEventResult::Invalid(vec![ValidationError::AttributeValueError {
                            path: path.to_string(),
                            reason,
                        }])
                    } else if except
                        .as_ref()
                        .map(|ex| pattern_text_matches(ex, text))
                        .unwrap_or(false)
                    {
                        *walker = Walker::Dead {
                            why: "value matched the except clause".to_string(),
                        };
                        FireEventResult::Invalid(vec![ValidationError::AttributeValueError {
                            path: path.to_string(),
                            reason: "value matched the except clause".to_string(),
                        }])
                    } else {
                        *walker = Walker::Accepting;
                        FireEventResult::Ok
                    }
                }
                Err(e) => {
                    *walker = Walker::Dead {
                        why: e.reason.clone(),
                    };
                    FireEventResult::Invalid(vec![ValidationError::AttributeValueError {
                        path: path.to_string(),
                        reason: e.reason,
                    }])
                }
            },
            None => FireEventResult::Invalid(vec![ValidationError::generic(
                path,
                format!("unknown datatype '{}:{}'", dt.library, dt.name),
            )]),
        },
        _ => unreachable!("AwaitingText only wraps Text/Value/Data patterns"),
    }
}

fn fire_in_branches(
    branches: &mut Vec<Walker>,
    mut op: impl FnMut(&mut Walker) -> FireEventResult,
) -> FireEventResult {
    let mut survivors = Vec::new();
    let mut last_err = None;
    for branch in branches.iter() {
        let mut clone = branch.clone();
        match op(&mut clone) {
            FireEventResult::Ok => survivors.push(clone),
            FireEventResult::Invalid(e) => last_err = Some(e),
        }
    }
    if survivors.is_empty() {
        FireEventResult::Invalid(last_err.unwrap_or_default())
    } else {
        *branches = survivors;
        FireEventResult::Ok
    }
}

/// Whether a standalone pattern (used for `data ... { except ... }`)
/// matches a text value, independent of any live walker. Constructs and
/// discards a scratch walker.
fn pattern_text_matches(pattern: &Arc<Pattern>, text: &str) -> bool {
    let mut walker = Walker::from_pattern(pattern);
    matches!(walker.fire_text(text, ""), FireEventResult::Ok) && walker.accepts_end().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(local: &str, content: Arc<Pattern>) -> Arc<Pattern> {
        Arc::new(Pattern::Element(
            NameClass::Name {
                ns: "".into(),
                local: local.into(),
            },
            content,
        ))
    }

    #[test]
    fn text_pattern_accepts_one_text_event() {
        let mut w = Walker::from_pattern(&Arc::new(Pattern::Text));
        assert!(w.fire_text("hello", "/a").is_ok());
        assert!(w.accepts_end().is_ok());
    }

    #[test]
    fn element_requires_matching_name_and_yields_child_content() {
        let pattern = elem("foo", Arc::new(Pattern::Text));
        let mut w = Walker::from_pattern(&pattern);
        let wrong = ExpandedName::new("", "bar");
        assert!(w.fire_start_tag(&wrong, "/").is_err());
        let right = ExpandedName::new("", "foo");
        let child = w.fire_start_tag(&right, "/").unwrap();
        assert!(w.accepts_end().is_ok());
        let mut child = child;
        assert!(child.fire_text("hi", "/foo").is_ok());
        assert!(child.accepts_end().is_ok());
    }

    #[test]
    fn group_sequences_two_elements() {
        let pattern = Arc::new(Pattern::Group(
            elem("a", Arc::new(Pattern::Empty)),
            elem("b", Arc::new(Pattern::Empty)),
        ));
        let mut w = Walker::from_pattern(&pattern);
        assert!(!w.accepts_end().is_ok());
        let mut a = w.fire_start_tag(&ExpandedName::new("", "a"), "/").unwrap();
        assert!(a.accepts_end().is_ok());
        let mut b = w.fire_start_tag(&ExpandedName::new("", "b"), "/").unwrap();
        assert!(b.accepts_end().is_ok());
        assert!(w.accepts_end().is_ok());
    }

    #[test]
    fn choice_picks_the_matching_branch() {
        let pattern = Arc::new(Pattern::Choice(
            elem("a", Arc::new(Pattern::Empty)),
            elem("b", Arc::new(Pattern::Empty)),
        ));
        let mut w = Walker::from_pattern(&pattern);
        w.fire_start_tag(&ExpandedName::new("", "b"), "/").unwrap();
        assert!(w.accepts_end().is_ok());
    }

    #[test]
    fn choice_does_not_admit_a_second_branch_after_the_first_matched() {
        let pattern = Arc::new(Pattern::Choice(
            elem("a", Arc::new(Pattern::Empty)),
            elem("b", Arc::new(Pattern::Empty)),
        ));
        let mut w = Walker::from_pattern(&pattern);
        w.fire_start_tag(&ExpandedName::new("", "a"), "/").unwrap();
        assert!(w.fire_start_tag(&ExpandedName::new("", "b"), "/").is_err());
    }

    #[test]
    fn one_or_more_allows_repetition_and_terminates() {
        let pattern = Arc::new(Pattern::OneOrMore(elem("item", Arc::new(Pattern::Empty))));
        let mut w = Walker::from_pattern(&pattern);
        assert!(!w.accepts_end().is_ok());
        for _ in 0..3 {
            let child = w.fire_start_tag(&ExpandedName::new("", "item"), "/").unwrap();
            assert!(child.accepts_end().is_ok());
        }
        assert!(w.accepts_end().is_ok());
    }

    #[test]
    fn interleave_allows_either_side_first() {
        let pattern = Arc::new(Pattern::Interleave(
            elem("a", Arc::new(Pattern::Text)),
            elem("b", Arc::new(Pattern::Text)),
        ));
        let mut w = Walker::from_pattern(&pattern);
        let mut b = w.fire_start_tag(&ExpandedName::new("", "b"), "/").unwrap();
        b.fire_text("inside b", "/b").unwrap();
        assert!(b.accepts_end().is_ok());
        let mut a = w.fire_start_tag(&ExpandedName::new("", "a"), "/").unwrap();
        a.fire_text("inside a", "/a").unwrap();
        assert!(a.accepts_end().is_ok());
        assert!(w.accepts_end().is_ok());
    }

    #[test]
    fn possible_reports_every_live_choice_branch_name() {
        let pattern = Arc::new(Pattern::Choice(
            elem("a", Arc::new(Pattern::Empty)),
            elem("b", Arc::new(Pattern::Empty)),
        ));
        let w = Walker::from_pattern(&pattern);
        let possible = w.possible();
        assert!(!possible.end);
        assert!(!possible.open_ended);
        assert_eq!(possible.names.len(), 2);
        assert!(possible.names.contains(&ExpandedName::new("", "a")));
        assert!(possible.names.contains(&ExpandedName::new("", "b")));
    }

    #[test]
    fn possible_marks_any_name_elements_open_ended() {
        let pattern = Arc::new(Pattern::Element(
            NameClass::AnyName { except: None },
            Arc::new(Pattern::Empty),
        ));
        let w = Walker::from_pattern(&pattern);
        let possible = w.possible();
        assert!(possible.open_ended);
        assert!(possible.names.is_empty());
    }

    #[test]
    fn attribute_matches_name_and_validates_value() {
        let pattern = Arc::new(Pattern::Attribute(
            NameClass::Name {
                ns: "".into(),
                local: "id".into(),
            },
            Arc::new(Pattern::Text),
        ));
        let mut w = Walker::from_pattern(&pattern);
        assert!(w
            .fire_attribute(&ExpandedName::new("", "id"), "42", "/@id")
            .is_ok());
        assert!(w.accepts_end_attributes());
    }
}
