//! # Redress Protocol
//!
//! Shared vocabulary and persisted entities for the dispute engine.
//!
//! Everything here is an external contract: the methodology and reason-code
//! enumerations are consumed by operator UIs, the [`Dispute`] record shape is
//! what the store persists and what audit tooling reads back, and the
//! [`ValidationReport`] is rendered verbatim as evidence warnings. Changes to
//! serialized names are breaking.

mod client;
mod dispute;
mod item;
mod reason_codes;
mod vocab;

pub use client::ClientProfile;
pub use dispute::{
    Dispute, EscalationRecord, MissingRequirement, ValidationReport, DISPUTE_SCHEMA_VERSION,
};
pub use item::{BureauPresence, EvidenceDocument, NegativeItem, Severity};
pub use reason_codes::{
    intrinsic_reason_codes, reason_tier, required_documents, RiskTier, AUTO_ESCALATION_CODES,
};
pub use vocab::{
    Bureau, DisputeStatus, ItemType, Methodology, Outcome, Recipient, VocabError,
};
