//! Core validation engine: grammar representation and the stateful walkers
//! that match an instance document against it.
//!
//! - [`name_resolver`]: XML namespace-prefix resolution.
//! - [`name_class`]: Relax NG name classes.
//! - [`datatype`]: the XSD/builtin datatype libraries and facet checking.
//! - [`regexp`]: translates XSD `pattern` facet regular expressions to the
//!   `regex` crate's ECMA-ish dialect.
//! - [`pattern`]: the immutable, simplified-form grammar tree.
//! - [`walker`]: the mutable per-content-model validation state.
//! - [`grammar_walker`]: the document-level driver that nests `walker`s.
//! - [`errors`]: error types shared across the above.

pub mod datatype;
pub mod errors;
pub mod grammar_walker;
pub mod name_class;
pub mod name_resolver;
pub mod pattern;
pub mod regexp;
pub mod walker;
