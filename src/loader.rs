//! Schema loader: reconstructs a [`Pattern`] tree from the JSON wire format
//! (format version 3) emitted by an external simplification/conversion
//! step. This crate only reads that format; it never writes it, and never
//! runs simplification itself (see crate-level docs).
//!
//! ```text
//! { "v": 3, "o": <uint>, "d": <node> }
//! node := [ctor, path?, arg, ...]
//! ctor := non-negative integer (compact) | string (verbose, debug only)
//! ```
//! Bit 0 of `o` is `OPTION_NO_PATHS`: when clear, every node carries a path
//! string immediately after its ctor; when set, paths are omitted and error
//! messages fall back to a synthesized trail.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::core::datatype::{self, Datatype};
use crate::core::errors::LoadError;
use crate::core::name_class::NameClass;
use crate::core::pattern::{DatatypeRef, Pattern, RefTarget};

/// Bit 0 of the `o` flags field: when set, nodes omit their path string.
pub const OPTION_NO_PATHS: u64 = 0x1;

/// Options controlling loader behavior beyond what the wire format itself
/// encodes. Mirrors `salve-convert --allow-incomplete-types`, which is an
/// external collaborator's CLI flag but whose loader-level effect is in
/// scope here.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// When `true`, an unrecognized `(library, name)` datatype reference
    /// loads as a pattern that rejects every value (tagged with the
    /// reason) instead of failing the whole load.
    pub allow_incomplete_types: bool,
}

enum NodeKind {
    Pattern(Arc<Pattern>),
    NameClass(NameClass),
}

type CtorFn = fn(&mut LoadCtx, &[Value]) -> Result<NodeKind, LoadError>;

struct CtorEntry {
    name: &'static str,
    ctor: CtorFn,
}

/// The `(code, name, ctor)` triples the whole table is built from, so the
/// numeric and verbose-string forms can never drift apart.
const CTORS: &[(u32, &str, CtorFn)] = &[
    (0, "Grammar", ctor_grammar),
    (1, "Define", ctor_define),
    (2, "Ref", ctor_ref),
    (3, "Element", ctor_element),
    (4, "Attribute", ctor_attribute),
    (5, "Name", ctor_name),
    (6, "NameChoice", ctor_name_choice),
    (7, "NsName", ctor_ns_name),
    (8, "AnyName", ctor_any_name),
    (9, "Choice", ctor_choice),
    (10, "Group", ctor_group),
    (11, "Interleave", ctor_interleave),
    (12, "OneOrMore", ctor_one_or_more),
    (13, "Value", ctor_value),
    (14, "Data", ctor_data),
    (15, "List", ctor_list),
    (16, "Text", ctor_text),
    (17, "Empty", ctor_empty),
    (18, "NotAllowed", ctor_not_allowed),
];

static BY_CODE: Lazy<HashMap<u32, CtorEntry>> = Lazy::new(|| {
    CTORS
        .iter()
        .map(|&(code, name, ctor)| (code, CtorEntry { name, ctor }))
        .collect()
});

static BY_NAME: Lazy<HashMap<&'static str, CtorFn>> = Lazy::new(|| {
    CTORS
        .iter()
        .map(|&(_, name, ctor)| (name, ctor))
        .collect()
});

/// Load a version-3 JSON schema into a pattern tree ready to drive a
/// [`crate::core::grammar_walker::GrammarWalker`].
pub fn load(json: &str, options: &LoaderOptions) -> Result<Arc<Pattern>, LoadError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| LoadError::Malformed(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| LoadError::Malformed("top-level value is not an object".into()))?;
    let version = obj
        .get("v")
        .and_then(Value::as_u64)
        .ok_or_else(|| LoadError::Malformed("missing 'v' field".into()))?;
    if version != 3 {
        return Err(LoadError::UnsupportedFormatVersion(version));
    }
    let flags = obj.get("o").and_then(Value::as_u64).unwrap_or(0);
    let include_paths = flags & OPTION_NO_PATHS == 0;
    let root = obj
        .get("d")
        .ok_or_else(|| LoadError::Malformed("missing 'd' field".into()))?;

    log::debug!(
        "loading v{} schema, paths {}",
        version,
        if include_paths { "included" } else { "omitted" }
    );

    let mut ctx = LoadCtx {
        include_paths,
        options: options.clone(),
        defines: HashMap::new(),
    };
    match ctx.parse_node(root)? {
        NodeKind::Pattern(p) => {
            log::debug!("schema loaded, {} defines resolved", ctx.defines.len());
            Ok(p)
        }
        NodeKind::NameClass(_) => Err(LoadError::Malformed(
            "top-level 'd' node must be a Grammar, not a name class".into(),
        )),
    }
}

struct LoadCtx {
    include_paths: bool,
    options: LoaderOptions,
    defines: HashMap<String, Arc<RefTarget>>,
}

impl LoadCtx {
    fn declare_define(&mut self, name: &str) -> Arc<RefTarget> {
        self.defines
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RefTarget::new()))
            .clone()
    }

    /// Look up a `ref`'s target among names already declared by a
    /// `Grammar`'s defines array. A name with no matching `Define` is a
    /// dangling ref, fatal at load time.
    fn lookup_ref(&self, name: &str) -> Result<Arc<RefTarget>, LoadError> {
        self.defines
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::DanglingRef(name.to_string()))
    }

    /// Split a node array into its ctor, optional path, and remaining args.
    fn split_node<'a>(&self, node: &'a Value) -> Result<(&'a Value, Option<&'a str>, &'a [Value]), LoadError> {
        let arr = node
            .as_array()
            .ok_or_else(|| LoadError::Malformed("node is not an array".into()))?;
        if arr.is_empty() {
            return Err(LoadError::Malformed("empty node array".into()));
        }
        let ctor = &arr[0];
        if self.include_paths {
            let path = arr
                .get(1)
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::Malformed("missing path string on node".into()))?;
            Ok((ctor, Some(path), &arr[2..]))
        } else {
            Ok((ctor, None, &arr[1..]))
        }
    }

    fn parse_node(&mut self, node: &Value) -> Result<NodeKind, LoadError> {
        let (ctor, _path, args) = self.split_node(node)?;
        let entry = if let Some(code) = ctor.as_u64() {
            BY_CODE
                .get(&(code as u32))
                .map(|e| e.ctor)
                .ok_or_else(|| LoadError::UnknownCtor(code.to_string()))?
        } else if let Some(name) = ctor.as_str() {
            *BY_NAME
                .get(name)
                .ok_or_else(|| LoadError::UnknownCtor(name.to_string()))?
        } else {
            return Err(LoadError::Malformed("ctor is neither a number nor a string".into()));
        };
        entry(self, args)
    }

    fn parse_pattern(&mut self, node: &Value) -> Result<Arc<Pattern>, LoadError> {
        match self.parse_node(node)? {
            NodeKind::Pattern(p) => Ok(p),
            NodeKind::NameClass(_) => {
                Err(LoadError::Malformed("expected a pattern node, found a name class".into()))
            }
        }
    }

    fn parse_name_class(&mut self, node: &Value) -> Result<NameClass, LoadError> {
        match self.parse_node(node)? {
            NodeKind::NameClass(nc) => Ok(nc),
            NodeKind::Pattern(_) => {
                Err(LoadError::Malformed("expected a name class node, found a pattern".into()))
            }
        }
    }

    fn parse_params(&self, args: &[Value]) -> Result<datatype::RawParams, LoadError> {
        let obj = args
            .get(0)
            .and_then(Value::as_object)
            .ok_or_else(|| LoadError::Malformed("expected a params object".into()))?;
        obj.iter()
            .map(|(k, v)| {
                v.as_str()
                    .map(|s| (k.clone(), s.to_string()))
                    .ok_or_else(|| LoadError::Malformed(format!("facet '{}' is not a string", k)))
            })
            .collect()
    }
}

fn str_arg(args: &[Value], i: usize) -> Result<String, LoadError> {
    args.get(i)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LoadError::Malformed(format!("expected a string at argument {}", i)))
}

fn ctor_grammar(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let defines = args
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| LoadError::Malformed("Grammar's first argument must be an array of Define nodes".into()))?;
    // First pass: create every named target so forward refs resolve.
    for define in defines {
        let (_, _, define_args) = ctx.split_node(define)?;
        let name = str_arg(define_args, 0)?;
        ctx.declare_define(&name);
    }
    // Second pass: parse each define's body and bind its target.
    for define in defines {
        let (_, _, define_args) = ctx.split_node(define)?;
        let name = str_arg(define_args, 0)?;
        let body = define_args
            .get(1)
            .ok_or_else(|| LoadError::Malformed(format!("define '{}' has no body", name)))?;
        let pattern = ctx.parse_pattern(body)?;
        ctx.lookup_ref(&name)?.bind(pattern);
    }
    let start = args
        .get(1)
        .ok_or_else(|| LoadError::Malformed("Grammar is missing its start pattern".into()))?;
    Ok(NodeKind::Pattern(ctx.parse_pattern(start)?))
}

fn ctor_define(_ctx: &mut LoadCtx, _args: &[Value]) -> Result<NodeKind, LoadError> {
    // `Define` nodes only ever appear inside a `Grammar`'s defines array,
    // where `ctor_grammar` destructures them directly without dispatching
    // back through `parse_node`.
    Err(LoadError::Malformed(
        "Define node encountered outside a Grammar's defines array".into(),
    ))
}

fn ctor_ref(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let name = str_arg(args, 0)?;
    let target = ctx.lookup_ref(&name)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Ref { name, target })))
}

fn ctor_element(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let name_node = args
        .get(0)
        .ok_or_else(|| LoadError::Malformed("Element is missing its name class".into()))?;
    let name_class = ctx.parse_name_class(name_node)?;
    let content_node = args
        .get(1)
        .ok_or_else(|| LoadError::Malformed("Element is missing its content".into()))?;
    let content = ctx.parse_pattern(content_node)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Element(name_class, content))))
}

fn ctor_attribute(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let name_node = args
        .get(0)
        .ok_or_else(|| LoadError::Malformed("Attribute is missing its name class".into()))?;
    let name_class = ctx.parse_name_class(name_node)?;
    let content_node = args
        .get(1)
        .ok_or_else(|| LoadError::Malformed("Attribute is missing its content".into()))?;
    let content = ctx.parse_pattern(content_node)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Attribute(name_class, content))))
}

fn ctor_name(_ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let ns = str_arg(args, 0)?;
    let local = str_arg(args, 1)?;
    Ok(NodeKind::NameClass(NameClass::Name { ns, local }))
}

fn ctor_name_choice(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let a = ctx.parse_name_class(args.get(0).ok_or_else(|| LoadError::Malformed("NameChoice missing first branch".into()))?)?;
    let b = ctx.parse_name_class(args.get(1).ok_or_else(|| LoadError::Malformed("NameChoice missing second branch".into()))?)?;
    Ok(NodeKind::NameClass(NameClass::NameChoice(Box::new(a), Box::new(b))))
}

fn ctor_ns_name(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let ns = str_arg(args, 0)?;
    let except = match args.get(1) {
        Some(Value::Null) | None => None,
        Some(node) => Some(Box::new(ctx.parse_name_class(node)?)),
    };
    Ok(NodeKind::NameClass(NameClass::NsName { ns, except }))
}

fn ctor_any_name(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let except = match args.get(0) {
        Some(Value::Null) | None => None,
        Some(node) => Some(Box::new(ctx.parse_name_class(node)?)),
    };
    Ok(NodeKind::NameClass(NameClass::AnyName { except }))
}

fn ctor_choice(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let a = ctx.parse_pattern(args.get(0).ok_or_else(|| LoadError::Malformed("Choice missing first branch".into()))?)?;
    let b = ctx.parse_pattern(args.get(1).ok_or_else(|| LoadError::Malformed("Choice missing second branch".into()))?)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Choice(a, b))))
}

fn ctor_group(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let a = ctx.parse_pattern(args.get(0).ok_or_else(|| LoadError::Malformed("Group missing first child".into()))?)?;
    let b = ctx.parse_pattern(args.get(1).ok_or_else(|| LoadError::Malformed("Group missing second child".into()))?)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Group(a, b))))
}

fn ctor_interleave(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let a = ctx.parse_pattern(args.get(0).ok_or_else(|| LoadError::Malformed("Interleave missing first child".into()))?)?;
    let b = ctx.parse_pattern(args.get(1).ok_or_else(|| LoadError::Malformed("Interleave missing second child".into()))?)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Interleave(a, b))))
}

fn ctor_one_or_more(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let inner = ctx.parse_pattern(args.get(0).ok_or_else(|| LoadError::Malformed("OneOrMore missing its child".into()))?)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::OneOrMore(inner))))
}

fn resolve_datatype_ref(
    ctx: &LoadCtx,
    library: String,
    name: String,
    raw: datatype::RawParams,
) -> Result<DatatypeRef, LoadError> {
    match datatype::lookup(&library, &name) {
        Some(ty) => {
            let params = ty.parse_params(&raw)?;
            Ok(DatatypeRef {
                library,
                name,
                params,
            })
        }
        None if ctx.options.allow_incomplete_types => Ok(DatatypeRef {
            library: library.clone(),
            name: name.clone(),
            params: Default::default(),
        }),
        None => Err(LoadError::UnsupportedDatatype { library, name }),
    }
}

fn ctor_value(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let library = str_arg(args, 0)?;
    let name = str_arg(args, 1)?;
    let value = str_arg(args, 2)?;
    let raw = ctx.parse_params(&args[3..])?;
    let datatype = resolve_datatype_ref(ctx, library, name, raw)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::Value { datatype, value })))
}

fn ctor_data(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let library = str_arg(args, 0)?;
    let name = str_arg(args, 1)?;
    let raw = ctx.parse_params(args.get(2..).unwrap_or(&[]))?;
    let datatype = resolve_datatype_ref(ctx, library, name, raw)?;
    let except = match args.get(3) {
        Some(Value::Null) | None => None,
        Some(node) => Some(ctx.parse_pattern(node)?),
    };
    Ok(NodeKind::Pattern(Arc::new(Pattern::Data { datatype, except })))
}

fn ctor_list(ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let inner = ctx.parse_pattern(args.get(0).ok_or_else(|| LoadError::Malformed("List missing its child".into()))?)?;
    Ok(NodeKind::Pattern(Arc::new(Pattern::List(inner))))
}

fn ctor_text(_ctx: &mut LoadCtx, _args: &[Value]) -> Result<NodeKind, LoadError> {
    Ok(NodeKind::Pattern(Arc::new(Pattern::Text)))
}

fn ctor_empty(_ctx: &mut LoadCtx, _args: &[Value]) -> Result<NodeKind, LoadError> {
    Ok(NodeKind::Pattern(Pattern::empty()))
}

fn ctor_not_allowed(_ctx: &mut LoadCtx, args: &[Value]) -> Result<NodeKind, LoadError> {
    let why = args
        .get(0)
        .and_then(Value::as_str)
        .unwrap_or("notAllowed")
        .to_string();
    Ok(NodeKind::Pattern(Pattern::not_allowed(why)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grammar_walker::GrammarWalker;
    use crate::core::name_resolver::ExpandedName;
    use crate::event::Event;

    fn name(local: &str) -> ExpandedName {
        ExpandedName::new("", local)
    }

    #[test]
    fn loads_a_simple_element_schema() {
        let json = r#"{
            "v": 3,
            "o": 1,
            "d": [0, [], [3, [5, "", "foo"], [17]]]
        }"#;
        let pattern = load(json, &LoaderOptions::default()).unwrap();
        let mut gw = GrammarWalker::new(pattern);
        assert!(gw.fire_event(Event::EnterStartTag(name("foo"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.is_complete());
    }

    #[test]
    fn resolves_a_recursive_define_via_ref() {
        let json = r#"{
            "v": 3,
            "o": 1,
            "d": [0,
                [
                    [1, "item",
                        [3, [5, "", "item"],
                            [9, [17], [2, "item"]]
                        ]
                    ]
                ],
                [2, "item"]
            ]
        }"#;
        let pattern = load(json, &LoaderOptions::default()).unwrap();
        let mut gw = GrammarWalker::new(pattern);
        assert!(gw.fire_event(Event::EnterStartTag(name("item"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::EnterStartTag(name("item"))).is_ok());
        assert!(gw.fire_event(Event::LeaveStartTag).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.fire_event(Event::EndTag).is_ok());
        assert!(gw.is_complete());
    }

    #[test]
    fn unknown_format_version_is_fatal() {
        let json = r#"{ "v": 2, "o": 0, "d": [17] }"#;
        let err = load(json, &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormatVersion(2)));
    }

    #[test]
    fn unsupported_datatype_is_fatal_unless_allowed() {
        let json = r#"{
            "v": 3,
            "o": 1,
            "d": [0, [], [14, "http://www.w3.org/2001/XMLSchema-datatypes", "frobnicate", {}]]
        }"#;
        let err = load(json, &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDatatype { .. }));

        let opts = LoaderOptions {
            allow_incomplete_types: true,
        };
        assert!(load(json, &opts).is_ok());
    }

    #[test]
    fn dangling_ref_without_a_matching_define_is_fatal() {
        let json = r#"{ "v": 3, "o": 1, "d": [0, [], [2, "nowhere"]] }"#;
        let err = load(json, &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::DanglingRef(name) if name == "nowhere"));
    }

    #[test]
    fn data_node_missing_its_params_object_is_reported_not_panicked() {
        let json = r#"{
            "v": 3,
            "o": 1,
            "d": [0, [], [14, "http://www.w3.org/2001/XMLSchema-datatypes", "integer"]]
        }"#;
        let err = load(json, &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }
}
