//! The event vocabulary a [`crate::core::grammar_walker::GrammarWalker`]
//! consumes. An instance document is reduced, by whatever XML reader drives
//! this crate, to a stream of these events — this crate never parses XML
//! itself, and never resolves namespace prefixes on the caller's behalf:
//! names arrive already expanded. [`crate::core::name_resolver::NameResolver`]
//! is exposed via [`crate::core::grammar_walker::GrammarWalker::name_resolver`]
//! precisely so a caller can do that resolution (including the two-pass
//! "collect this start tag's `xmlns:*` declarations before resolving
//! anything else" dance XML namespaces require) before constructing events.

use crate::core::name_resolver::ExpandedName;

/// One instance-document event, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The opening angle bracket and already-resolved name of a start tag,
    /// before its attributes are reported.
    EnterStartTag(ExpandedName),
    /// One attribute on the currently open start tag.
    Attribute(ExpandedName, String),
    /// The closing `>` of a start tag, once all attributes have been
    /// reported. Switches the walker from attribute-phase to content-phase
    /// for this element.
    LeaveStartTag,
    /// Character data appearing as element content.
    Text(String),
    /// The end tag closing the innermost open element.
    EndTag,
}

/// The outcome of firing a single [`Event`] against a walker. Distinct from
/// a `Result` because an unaccepted event is not an exceptional condition —
/// the walker keeps running, and a conforming validator simply reports the
/// error and carries on to find more problems in the same document.
#[derive(Debug, Clone, PartialEq)]
pub enum FireEventResult {
    /// The event was consistent with the pattern; the walker advanced.
    Ok,
    /// The event was not consistent with the pattern. Validation continues
    /// with the walker left in the invalid state it was in immediately
    /// before the event (the walker does not roll back).
    Invalid(Vec<crate::core::errors::ValidationError>),
}

impl FireEventResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, FireEventResult::Ok)
    }
}

/// The outcome of asking a walker whether it can legally end here (`end()`
/// on content, `end_attributes()` on an attribute set).
#[derive(Debug, Clone, PartialEq)]
pub enum EndResult {
    Ok,
    Invalid(Vec<crate::core::errors::ValidationError>),
}

impl EndResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, EndResult::Ok)
    }
}

/// The acceptance set a walker reports via `possible`/`possible_attributes`:
/// which start-tag or attribute names, if any, would be accepted next,
/// whether a `Text` event would, and whether ending here is legal.
/// `open_ended` is set instead of enumerating `names` when a name class
/// (`anyName`/`nsName`) matches infinitely many names — the set is real,
/// just not listable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PossibleEvents {
    pub names: Vec<ExpandedName>,
    pub text: bool,
    pub end: bool,
    pub open_ended: bool,
}
