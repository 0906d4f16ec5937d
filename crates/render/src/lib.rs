//! # Redress Render
//!
//! Letter-template rendering: `{{name}}` substitution and
//! `{{#if name}}...{{/if}}` conditional blocks.
//!
//! The placeholder syntax is the only wire format the engine defines. Mailed
//! letters are retained for audit, so rendering must stay byte-stable: the
//! same (template, variables) pair always yields the same output, and nothing
//! in here can fail. Unknown variables substitute as the empty string,
//! malformed markup is passed through verbatim.
//!
//! Conditional spans are non-nested and non-overlapping.

mod engine;

pub use engine::{extract_placeholders, is_identifier, is_truthy, render, VarMap};
