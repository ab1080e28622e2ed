//! The Relax NG pattern tree.
//!
//! A [`Pattern`] is the *simplified-form* grammar, already reduced to the
//! handful of constructors simplification leaves behind (see GLOSSARY).
//! Patterns are immutable and reference-counted (`Arc`) rather than
//! `Rc`-owned: a single schema's pattern tree is shared read-only across
//! every [`crate::core::grammar_walker::GrammarWalker`] validating against
//! it, possibly from different threads, so the tree itself is `Send + Sync`.
//! Mutable validation state lives entirely in the parallel
//! [`crate::core::walker::Walker`] tree instead.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::core::name_class::NameClass;

/// The unresolved target of a `ref`. Filled in once, by the loader, after
/// the whole grammar's `define`s have been constructed — this is what lets
/// mutually- and self-recursive grammars exist as a `Pattern` tree at all
/// without infinite construction.
#[derive(Debug, Default)]
pub struct RefTarget(OnceCell<Arc<Pattern>>);

impl RefTarget {
    pub fn new() -> Self {
        RefTarget(OnceCell::new())
    }

    /// Bind this ref's target. Called once per `define`, while the grammar
    /// is being loaded; calling it twice on the same target is a loader bug.
    pub fn bind(&self, pattern: Arc<Pattern>) {
        self.0
            .set(pattern)
            .unwrap_or_else(|_| panic!("RefTarget bound twice"));
    }

    pub fn get(&self) -> Option<&Arc<Pattern>> {
        self.0.get()
    }
}

/// A single `data` pattern's datatype reference: library URI, local name,
/// and its already-parsed facet parameters.
#[derive(Debug, Clone)]
pub struct DatatypeRef {
    pub library: String,
    pub name: String,
    pub params: crate::core::datatype::CommonParams,
}

#[derive(Debug)]
pub enum Pattern {
    /// Matches only the empty sequence of events.
    Empty,
    /// Matches nothing at all. Carries a human-readable reason so loader-
    /// and restriction-checking code can explain *why* a branch collapsed
    /// to `notAllowed` (e.g. a name-class overlap rejected during
    /// simplification upstream).
    NotAllowed { why: String },
    /// Matches any single text event, any number of times, without
    /// datatype-constraining its content.
    Text,
    /// A `value` pattern: the character content of a single text event must
    /// equal `value` under the named datatype's equality.
    Value {
        datatype: DatatypeRef,
        value: String,
    },
    /// A `data` pattern: the character content of a single text event must
    /// satisfy the named datatype's facets. `except` excludes values also
    /// matched by a nested pattern (RelaxNG's `data ... { except ... }`).
    Data {
        datatype: DatatypeRef,
        except: Option<Arc<Pattern>>,
    },
    /// `list`: the text content, split on whitespace, is matched against
    /// the inner pattern token by token.
    List(Arc<Pattern>),
    Group(Arc<Pattern>, Arc<Pattern>),
    Interleave(Arc<Pattern>, Arc<Pattern>),
    Choice(Arc<Pattern>, Arc<Pattern>),
    OneOrMore(Arc<Pattern>),
    Element(NameClass, Arc<Pattern>),
    Attribute(NameClass, Arc<Pattern>),
    /// A reference to a named `define`, resolved post-construction via
    /// [`RefTarget`].
    Ref {
        name: String,
        target: Arc<RefTarget>,
    },
}

impl Pattern {
    pub fn empty() -> Arc<Pattern> {
        Arc::new(Pattern::Empty)
    }

    pub fn not_allowed(why: impl Into<String>) -> Arc<Pattern> {
        Arc::new(Pattern::NotAllowed { why: why.into() })
    }

    /// Whether this pattern's content model can match a zero-length event
    /// sequence (the classic Relax NG "nullable"/`hasEmptyPattern` check,
    /// used by `oneOrMore`'s termination and `group`'s attribute-subtree
    /// disambiguation).
    pub fn has_empty_pattern(&self) -> bool {
        match self {
            Pattern::Empty => true,
            Pattern::NotAllowed { .. } => false,
            Pattern::Text => true,
            Pattern::Value { .. } | Pattern::Data { .. } => false,
            Pattern::List(_) => false,
            Pattern::Group(a, b) | Pattern::Interleave(a, b) => {
                a.has_empty_pattern() && b.has_empty_pattern()
            }
            Pattern::Choice(a, b) => a.has_empty_pattern() || b.has_empty_pattern(),
            Pattern::OneOrMore(inner) => inner.has_empty_pattern(),
            Pattern::Element(..) => false,
            Pattern::Attribute(..) => false,
            Pattern::Ref { target, .. } => target
                .get()
                .map(|p| p.has_empty_pattern())
                .unwrap_or(false),
        }
    }

    /// Whether this pattern can directly contain an `attribute` pattern
    /// (used by section 7.2's groupability checks: simple content and
    /// attributes may not be siblings in the same group/interleave/choice).
    pub fn has_attrs(&self) -> bool {
        match self {
            Pattern::Attribute(..) => true,
            Pattern::Group(a, b) | Pattern::Interleave(a, b) | Pattern::Choice(a, b) => {
                a.has_attrs() || b.has_attrs()
            }
            Pattern::OneOrMore(inner) => inner.has_attrs(),
            Pattern::Ref { target, .. } => target.get().map(|p| p.has_attrs()).unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_text_are_nullable() {
        assert!(Pattern::empty().has_empty_pattern());
        assert!(Arc::new(Pattern::Text).has_empty_pattern());
    }

    #[test]
    fn not_allowed_is_never_nullable() {
        assert!(!Pattern::not_allowed("unreachable").has_empty_pattern());
    }

    #[test]
    fn group_is_nullable_only_if_both_sides_are() {
        let g = Arc::new(Pattern::Group(Pattern::empty(), Arc::new(Pattern::Text)));
        assert!(g.has_empty_pattern());
        let g2 = Arc::new(Pattern::Group(
            Pattern::empty(),
            Arc::new(Pattern::Element(
                NameClass::Name {
                    ns: "".into(),
                    local: "a".into(),
                },
                Pattern::empty(),
            )),
        ));
        assert!(!g2.has_empty_pattern());
    }

    #[test]
    fn ref_defers_to_its_resolved_target() {
        let target = Arc::new(RefTarget::new());
        target.bind(Pattern::empty());
        let r = Arc::new(Pattern::Ref {
            name: "foo".into(),
            target,
        });
        assert!(r.has_empty_pattern());
    }
}
