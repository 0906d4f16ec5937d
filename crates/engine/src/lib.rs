//! # Redress Engine
//!
//! Letter composition and the dispute lifecycle.
//!
//! ## Pipeline
//!
//! ```text
//! ComposeRequest
//!     │
//!     ├──> Methodology Selector (rules + advisory threshold)
//!     │      └─> DisputeStrategy
//!     │
//!     ├──> Evidence Gate (risk tiers, override audit)
//!     │
//!     ├──> Template Library ──> Renderer
//!     │      └─> letter body per (bureau × item group)
//!     │
//!     └──> DisputeStore (drafts, one row per letter)
//!
//! EscalationScheduler::run(now)
//!     └─> conditional `sent/in_progress -> escalated` over all due disputes
//! ```
//!
//! The engine is request-scoped and stateless between invocations; all I/O
//! goes through the collaborator traits ([`ClientDirectory`],
//! [`EvidenceVault`], [`DisputeStore`], [`TransitionNotifier`]), so tests
//! drive it entirely in memory with a controlled clock.

mod collaborators;
mod compose;
mod config;
mod error;
pub mod lifecycle;
mod scheduler;
mod service;
mod store;

pub use collaborators::{
    ClientDirectory, DisputeStore, EvidenceVault, LogNotifier, TransitionNotifier, UpdateOutcome,
};
pub use compose::{CombinePolicy, ComposeOutcome, ComposeRequest, LetterComposer, UnitFailure};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use scheduler::{EscalationScheduler, SchedulerFailure, SchedulerReport};
pub use service::DisputeService;
pub use store::{JsonFileStore, MemoryDisputeStore};
