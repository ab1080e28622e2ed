//! The top-level driver: turns a stream of [`crate::event::Event`]s into
//! calls against a stack of [`Walker`]s.
//!
//! This is the one place in the crate that knows about document nesting.
//! Every other type (`Pattern`, `Walker`) only ever reasons about a single
//! content model in isolation; `GrammarWalker` is what turns that into
//! "validate this whole instance document", by pushing a fresh `Walker`
//! each time an element opens and popping it when the matching end tag
//! arrives.

use std::sync::Arc;

use crate::core::errors::ValidationError;
use crate::core::name_resolver::NameResolver;
use crate::core::pattern::Pattern;
use crate::core::walker::Walker;
use crate::event::{EndResult, Event, FireEventResult, PossibleEvents};

/// Drives one instance document's validation against a single grammar's
/// start pattern. Not `Clone`: a walker's stack is inherently tied to the
/// one document it is validating (spec's "no concurrent validation of the
/// same walker" non-goal).
pub struct GrammarWalker {
    start: Arc<Pattern>,
    /// Content walkers for every currently-open element, outermost first.
    /// Empty only before the root element opens and after it closes.
    stack: Vec<Walker>,
    /// Whether the innermost open element is still reporting attributes
    /// (`true` from `EnterStartTag` until the matching `LeaveStartTag`).
    in_attributes: bool,
    resolver: NameResolver,
    path: Vec<String>,
    /// Set once the root element's `EndTag` has been processed.
    root_closed: bool,
}

impl GrammarWalker {
    pub fn new(start: Arc<Pattern>) -> Self {
        GrammarWalker {
            start,
            stack: Vec::new(),
            in_attributes: false,
            resolver: NameResolver::new(),
            path: Vec::new(),
            root_closed: false,
        }
    }

    /// The namespace-prefix resolver a caller can use to expand the raw
    /// `QName`s an XML parser hands it into the `ExpandedName`s this
    /// walker's events require. Exposed rather than used internally:
    /// resolving namespaces needs a two-pass scan of a start tag's
    /// attributes this crate never sees (see [`crate::event`]).
    pub fn name_resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn name_resolver_mut(&mut self) -> &mut NameResolver {
        &mut self.resolver
    }

    fn current_path(&self) -> String {
        if self.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.path.join("/"))
        }
    }

    /// Feed one event to the walker. Returns `FireEventResult::Invalid`
    /// without aborting: a conforming caller keeps driving the same
    /// document to collect every error, not just the first.
    pub fn fire_event(&mut self, event: Event) -> FireEventResult {
        match event {
            Event::EnterStartTag(name) => {
                let path = self.current_path();
                let result = match self.stack.last_mut() {
                    None => {
                        // The start pattern models the document itself: a
                        // single root element slot. It is consumed in one
                        // shot here and never pushed — only the content
                        // walker for the root element's own children goes
                        // on the stack.
                        let mut document = Walker::from_pattern(&self.start);
                        document.fire_start_tag(&name, &path)
                    }
                    Some(top) => top.fire_start_tag(&name, &path),
                };
                match result {
                    Ok(child) => {
                        self.stack.push(child);
                        self.path.push(format!("{{{}}}{}", name.ns, name.local));
                        self.in_attributes = true;
                        log::trace!("{} entered, depth {}", path, self.stack.len());
                        FireEventResult::Ok
                    }
                    Err(errs) => {
                        log::debug!("{} rejected start tag {}: {:?}", path, name.local, errs);
                        FireEventResult::Invalid(errs)
                    }
                }
            }
            Event::Attribute(name, value) => {
                let path = self.current_path();
                match self.stack.last_mut() {
                    Some(top) if self.in_attributes => {
                        match top.fire_attribute(&name, &value, &path) {
                            Ok(()) => FireEventResult::Ok,
                            Err(errs) => FireEventResult::Invalid(errs),
                        }
                    }
                    _ => FireEventResult::Invalid(vec![ValidationError::generic(
                        path,
                        "attribute reported outside a start tag",
                    )]),
                }
            }
            Event::LeaveStartTag => {
                let path = self.current_path();
                match self.stack.last() {
                    Some(top) if self.in_attributes => {
                        let ok = top.accepts_end_attributes();
                        self.in_attributes = false;
                        if ok {
                            FireEventResult::Ok
                        } else {
                            FireEventResult::Invalid(vec![ValidationError::generic(
                                path,
                                "required attribute is missing",
                            )])
                        }
                    }
                    _ => FireEventResult::Invalid(vec![ValidationError::generic(
                        path,
                        "unexpected end of start tag",
                    )]),
                }
            }
            Event::Text(text) => {
                let path = self.current_path();
                match self.stack.last_mut() {
                    Some(top) => top.fire_text(&text, &path),
                    None => FireEventResult::Invalid(vec![ValidationError::generic(
                        path,
                        "text outside the root element",
                    )]),
                }
            }
            Event::EndTag => {
                let path = self.current_path();
                match self.stack.last() {
                    Some(top) => {
                        let outcome = top.accepts_end();
                        self.stack.pop();
                        self.path.pop();
                        self.in_attributes = false;
                        if self.stack.is_empty() {
                            self.root_closed = true;
                            log::debug!("root element closed at {}", path);
                        }
                        match outcome {
                            EndResult::Ok => FireEventResult::Ok,
                            EndResult::Invalid(errs) => {
                                log::debug!("{} rejected end tag: {:?}", path, errs);
                                FireEventResult::Invalid(errs)
                            }
                        }
                    }
                    None => FireEventResult::Invalid(vec![ValidationError::generic(
                        path,
                        "unmatched end tag",
                    )]),
                }
            }
        }
    }

    /// Whether the document ended in a valid state: exactly one root
    /// element was seen and fully closed. Call once after the last event.
    pub fn is_complete(&self) -> bool {
        self.root_closed
    }

    /// Whether any element has been opened yet.
    pub fn has_started(&self) -> bool {
        !self.path.is_empty()
    }

    /// The current acceptance set — which event would be accepted if fired
    /// next, given everything fired so far. `event_index` exists for
    /// symmetry with callers that track a position in their own event log;
    /// this walker has no history to replay and always answers for its
    /// current position (see DESIGN.md).
    pub fn possible_at(&self, _event_index: usize) -> PossibleEvents {
        if self.in_attributes {
            match self.stack.last() {
                Some(top) => top.possible_attributes(),
                None => PossibleEvents::default(),
            }
        } else {
            match self.stack.last() {
                Some(top) => top.possible(),
                None => Walker::from_pattern(&self.start).possible(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::name_class::NameClass;
    use crate::core::name_resolver::ExpandedName;

    fn name(local: &str) -> ExpandedName {
        ExpandedName::new("", local)
    }

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
    fn validates_a_simple_nested_document() {
        let root = elem(
            "root",
            Arc::new(Pattern::Group(
                elem("child", Arc::new(Pattern::Text)),
                elem("child", Arc::new(Pattern::Empty)),
            )),
        );
        let mut gw = GrammarWalker::new(root);
        assert!(gw.fire_event(Event::EnterStartTag(name("root"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::EnterStartTag(name("child"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::Text("hi".into())).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.fire_event(Event::EnterStartTag(name("child"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.is_complete());
    }

    #[test]
    fn rejects_an_unexpected_child_name() {
        let root = elem("root", elem("only", Arc::new(Pattern::Empty)));
        let mut gw = GrammarWalker::new(root);
        gw.fire_event(Event::EnterStartTag(name("root")));
        gw.fire_event(Event::LeaveStartTag);
        let result = gw.fire_event(Event::EnterStartTag(name("wrong")));
        assert!(!result.is_ok());
    }

    #[test]
    fn possible_at_reports_the_root_name_before_anything_opens() {
        let root = elem("root", Arc::new(Pattern::Empty));
        let gw = GrammarWalker::new(root);
        let possible = gw.possible_at(0);
        assert_eq!(possible.names, vec![name("root")]);
    }

    #[test]
    fn possible_at_reports_attribute_names_during_the_attribute_phase() {
        let root = elem(
            "root",
            Arc::new(Pattern::Attribute(
                NameClass::Name {
                    ns: "".into(),
                    local: "id".into(),
                },
                Arc::new(Pattern::Text),
            )),
        );
        let mut gw = GrammarWalker::new(root);
        gw.fire_event(Event::EnterStartTag(name("root")));
        let possible = gw.possible_at(1);
        assert_eq!(possible.names, vec![name("id")]);
    }

    #[test]
    fn reports_missing_required_attribute() {
        let root = elem(
            "root",
            Arc::new(Pattern::Attribute(
                NameClass::Name {
                    ns: "".into(),
                    local: "id".into(),
                },
                Arc::new(Pattern::Text),
            )),
        );
        let mut gw = GrammarWalker::new(root);
        gw.fire_event(Event::EnterStartTag(name("root")));
        let result = gw.fire_event(Event::LeaveStartTag);
        assert!(!result.is_ok());
    }
}
