//! Error types for the validator.
//!
//! Two families, matching the reported-vs-fatal split from the design:
//! [`ValidationError`] is returned from walker operations (`fire_event`,
//! `end`, `end_attributes`) and never aborts a validation session — the
//! walker remains usable afterwards. [`LoadError`] is returned only from
//! [`crate::loader::load`] and is always fatal to the session.

use thiserror::Error;

/// An error surfaced while validating an instance document against a
/// pattern. These are reported, not raised: producing one does not stop
/// the walker from accepting further events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{path}: element name not allowed here: {actual}")]
    ElementNameError { path: String, actual: String },

    #[error("{path}: attribute name not allowed here: {actual}")]
    AttributeNameError { path: String, actual: String },

    #[error("{path}: invalid attribute value: {reason}")]
    AttributeValueError { path: String, reason: String },

    #[error("{path}: no branch of a choice accepted the input (tried: {alternatives:?})")]
    ChoiceError {
        path: String,
        alternatives: Vec<String>,
    },

    #[error("{path}: {message}")]
    Generic { path: String, message: String },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::ElementNameError { path, .. }
            | ValidationError::AttributeNameError { path, .. }
            | ValidationError::AttributeValueError { path, .. }
            | ValidationError::ChoiceError { path, .. }
            | ValidationError::Generic { path, .. } => path,
        }
    }

    pub fn generic(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Generic {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A datatype parameter-parsing error, raised at schema-load time when a
/// `data`/`value` pattern's facets are themselves invalid (e.g. `minLength`
/// greater than `maxLength`, or an invalid XSD `pattern` facet).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid datatype parameters for '{datatype}': {reason}")]
pub struct ParameterParsingError {
    pub datatype: String,
    pub reason: String,
}

/// A datatype value-validation error, raised while validating instance
/// text/attribute content against a datatype. Recoverable: the caller wraps
/// it in a [`ValidationError::AttributeValueError`], it never panics.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("value {value:?} does not satisfy datatype '{datatype}': {reason}")]
pub struct ValueValidationError {
    pub datatype: String,
    pub value: String,
    pub reason: String,
}

/// Errors that can only occur while reconstructing a pattern tree from the
/// JSON wire format. Always fatal to the loading session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported schema format version: {0} (only version 3 is supported)")]
    UnsupportedFormatVersion(u64),

    #[error("malformed schema JSON: {0}")]
    Malformed(String),

    #[error("unknown pattern constructor: {0}")]
    UnknownCtor(String),

    #[error("dangling ref: no define named '{0}' in the enclosing grammar")]
    DanglingRef(String),

    #[error("invalid datatype parameters: {0}")]
    ParameterParsing(#[from] ParameterParsingError),

    #[error(
        "unsupported datatype '{library}:{name}' (pass allow_incomplete_types to load anyway)"
    )]
    UnsupportedDatatype { library: String, name: String },

    #[error("invalid XSD regular expression in pattern facet: {0}")]
    InvalidRegexp(String),
}
