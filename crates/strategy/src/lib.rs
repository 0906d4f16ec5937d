//! # Redress Strategy
//!
//! Methodology selection and the evidence gate.
//!
//! The selector is a pure function: rule-based methodology choice, optional
//! advisory-classifier input accepted only above a fixed confidence
//! threshold, and reason-code assembly. The evidence validator partitions the
//! selected reason codes by risk tier and reports what is missing; whether to
//! honor an operator override is the composer's decision, not ours.

mod advisory;
mod error;
mod evidence;
mod selector;

pub use advisory::{AdvisoryClassifier, AdvisorySuggestion, ViolationAnnotation};
pub use error::{Result, StrategyError};
pub use evidence::validate_evidence;
pub use selector::{
    select_strategy, DisputeStrategy, PriorRoundOutcome, Provenance, ADVISORY_ACCEPTANCE_THRESHOLD,
};
