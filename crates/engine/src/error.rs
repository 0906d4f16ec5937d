use redress_protocol::{DisputeStatus, ValidationReport};
use redress_strategy::StrategyError;
use redress_templates::TemplateError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("Evidence requirements not met and no override supplied")]
    EvidenceBlocked { report: ValidationReport },

    #[error("No template for methodology '{methodology}' and recipient '{recipient}' (round {round})")]
    TemplateNotFound {
        methodology: String,
        recipient: String,
        round: u32,
    },

    #[error("Illegal status transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: DisputeStatus,
        to: DisputeStatus,
    },

    #[error("Letter body is empty; a dispute cannot be sent without content")]
    EmptyLetterBody,

    #[error("Client {0} not found")]
    ClientNotFound(Uuid),

    #[error("Dispute {0} not found")]
    DisputeNotFound(Uuid),

    #[error("Dispute {id} was updated concurrently (status is now {actual:?})")]
    StaleWrite { id: Uuid, actual: DisputeStatus },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Template library error: {0}")]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
