//! An incremental, event-driven Relax NG (simplified grammar) validator.
//!
//! Feed a stream of [`event::Event`]s — derived from an instance document
//! by whatever XML reader the caller is using — to a
//! [`core::grammar_walker::GrammarWalker`] built from a pattern tree loaded
//! with [`loader::load`]. Validation is incremental: `fire_event` advances
//! the walker one event at a time and reports errors without aborting, so a
//! caller (an editor, a streaming pipeline) can keep driving the same
//! document to collect every problem in it.
//!
//! This crate does not parse XML itself, does not perform schema
//! simplification, and does not implement the JSON schema *writer* — only
//! the reader for the version-3 wire format `loader` consumes.
//!
//! # Modules
//!
//! - [`core`]: the pattern/walker engine — name resolution, name classes,
//!   datatypes, the XSD-regex translator, the pattern tree, and the mutable
//!   walkers that match it against events.
//! - [`event`]: the event and result vocabulary `GrammarWalker` consumes.
//! - [`loader`]: reconstructs a pattern tree from the JSON wire format.

pub mod core;
pub mod event;
pub mod loader;

pub use core::datatype::{CommonParams, Datatype, ParsedValue, RawParams};
pub use core::errors::{LoadError, ParameterParsingError, ValidationError, ValueValidationError};
pub use core::grammar_walker::GrammarWalker;
pub use core::name_class::NameClass;
pub use core::name_resolver::{ExpandedName, NameResolver, QName, UnknownPrefixError};
pub use core::pattern::{DatatypeRef, Pattern, RefTarget};
pub use core::walker::Walker;
pub use event::{EndResult, Event, FireEventResult, PossibleEvents};
pub use loader::{LoaderOptions, OPTION_NO_PATHS};
