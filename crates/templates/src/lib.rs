//! # Redress Templates
//!
//! Versioned letter-template library.
//!
//! Templates are seed data: loaded once from a TOML file (or the built-in
//! set), validated, and never mutated at runtime. Resolution picks the
//! best-matching template for a (methodology, recipient, round, item type,
//! bureau) query, falling back to the methodology's generic template, and is
//! memoized through an LRU read-through cache that only `reload` invalidates.
//!
//! The library fingerprint ties every generated dispute to the exact template
//! revision it was rendered from.

mod error;
mod library;
mod template;

pub use error::{Result, TemplateError};
pub use library::{TemplateLibrary, TEMPLATE_SCHEMA_VERSION};
pub use template::{LetterTemplate, TemplateQuery};
