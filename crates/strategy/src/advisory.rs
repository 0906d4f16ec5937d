use async_trait::async_trait;
use redress_protocol::NegativeItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-item compliance-violation annotation reported by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationAnnotation {
    pub item_id: Uuid,
    pub code: String,
    pub description: String,
}

/// Raw classifier output for an item batch.
///
/// The methodology arrives as an untyped string and the confidence unclamped;
/// the selector validates both before anything downstream sees them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisorySuggestion {
    pub methodology: String,
    pub confidence: f64,
    #[serde(default)]
    pub violations: Vec<ViolationAnnotation>,
}

/// Optional external item classifier.
///
/// Treated as an opaque advisory collaborator: its output is a suggestion the
/// selector may reject, never a decision. Implementations that fail should
/// return `None` rather than an error the caller would have to unwrap — a
/// classifier outage must not block letter generation.
#[async_trait]
pub trait AdvisoryClassifier: Send + Sync {
    async fn classify(&self, items: &[NegativeItem], round: u32) -> Option<AdvisorySuggestion>;
}
