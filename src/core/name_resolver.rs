//! Namespace-prefix resolution.
//!
//! Maintains a stack of `{prefix -> namespaceURI}` frames mirroring XML's
//! lexical scoping rules: a prefix binding defined on an element is visible
//! on that element and its descendants until the element closes.

use std::collections::HashMap;

/// A resolved `(namespaceURI, localName)` pair. The empty string stands for
/// "no namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns: String,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns: impl Into<String>, local: impl Into<String>) -> Self {
        ExpandedName {
            ns: ns.into(),
            local: local.into(),
        }
    }
}

/// A qualified name as it appears in the instance document, not yet
/// resolved against the active namespace bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(prefix: Option<impl Into<String>>, local: impl Into<String>) -> Self {
        QName {
            prefix: prefix.map(Into::into),
            local: local.into(),
        }
    }

    pub fn unprefixed(local: impl Into<String>) -> Self {
        QName {
            prefix: None,
            local: local.into(),
        }
    }
}

/// Error returned when a qualified name's prefix has no binding in the
/// current context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unresolved namespace prefix '{0}'")]
pub struct UnknownPrefixError(pub String);

/// Stack of namespace-prefix bindings, pushed/popped as elements open/close.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    frames: Vec<HashMap<String, String>>,
}

impl NameResolver {
    pub fn new() -> Self {
        NameResolver { frames: Vec::new() }
    }

    /// Push a new, empty binding frame (called on `enterStartTag`).
    pub fn enter_context(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pop the innermost binding frame (called on `endTag`).
    pub fn leave_context(&mut self) {
        self.frames.pop();
    }

    /// Bind `prefix` to `uri` in the current (innermost) frame. An empty
    /// `prefix` defines the default namespace.
    pub fn define_prefix(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(prefix.into(), uri.into());
        } else {
            let mut frame = HashMap::new();
            frame.insert(prefix.into(), uri.into());
            self.frames.push(frame);
        }
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(prefix).map(String::as_str))
    }

    /// Resolve a qualified name to its expanded form.
    ///
    /// Attribute resolution differs from element resolution: an unprefixed
    /// attribute always has no namespace, while an unprefixed element
    /// inherits the current default namespace (bound under the empty-string
    /// prefix).
    pub fn resolve_name(
        &self,
        qname: &QName,
        attribute: bool,
    ) -> Result<ExpandedName, UnknownPrefixError> {
        match &qname.prefix {
            Some(prefix) if prefix == "xml" => Ok(ExpandedName::new(
                "http://www.w3.org/XML/1998/namespace",
                qname.local.clone(),
            )),
            Some(prefix) => match self.lookup(prefix) {
                Some(uri) => Ok(ExpandedName::new(uri, qname.local.clone())),
                None => Err(UnknownPrefixError(prefix.clone())),
            },
            None if attribute => Ok(ExpandedName::new("", qname.local.clone())),
            None => {
                let uri = self.lookup("").unwrap_or("");
                Ok(ExpandedName::new(uri, qname.local.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprefixed_element_inherits_default_namespace() {
        let mut r = NameResolver::new();
        r.enter_context();
        r.define_prefix("", "urn:example");
        let name = r
            .resolve_name(&QName::unprefixed("foo"), false)
            .expect("resolves");
        assert_eq!(name, ExpandedName::new("urn:example", "foo"));
    }

    #[test]
    fn unprefixed_attribute_has_no_namespace() {
        let mut r = NameResolver::new();
        r.enter_context();
        r.define_prefix("", "urn:example");
        let name = r
            .resolve_name(&QName::unprefixed("foo"), true)
            .expect("resolves");
        assert_eq!(name, ExpandedName::new("", "foo"));
    }

    #[test]
    fn unknown_prefix_is_reported() {
        let r = NameResolver::new();
        let err = r
            .resolve_name(&QName::new(Some("x"), "foo"), false)
            .unwrap_err();
        assert_eq!(err, UnknownPrefixError("x".to_string()));
    }

    #[test]
    fn context_pop_restores_outer_binding() {
        let mut r = NameResolver::new();
        r.enter_context();
        r.define_prefix("a", "urn:outer");
        r.enter_context();
        r.define_prefix("a", "urn:inner");
        assert_eq!(
            r.resolve_name(&QName::new(Some("a"), "x"), false)
                .unwrap()
                .ns,
            "urn:inner"
        );
        r.leave_context();
        assert_eq!(
            r.resolve_name(&QName::new(Some("a"), "x"), false)
                .unwrap()
                .ns,
            "urn:outer"
        );
    }
}
