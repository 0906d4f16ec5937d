use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redress_protocol::{ClientProfile, Dispute, DisputeStatus, EvidenceDocument, NegativeItem};
use uuid::Uuid;

/// Read access to client identity and parsed report items.
///
/// Backed by the account-management system; the engine never writes through
/// this seam.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn profile(&self, client_id: Uuid) -> Result<Option<ClientProfile>>;
    async fn items(&self, client_id: Uuid) -> Result<Vec<NegativeItem>>;
}

/// Read access to uploaded evidence documents (id + declared type only;
/// content stays in the document store).
#[async_trait]
pub trait EvidenceVault: Send + Sync {
    async fn documents(&self, client_id: Uuid) -> Result<Vec<EvidenceDocument>>;
}

/// Outcome of a conditional dispute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// The record's status no longer matched the expected value; the write
    /// was rejected. Concurrent scheduler runs converge through this.
    StaleStatus(DisputeStatus),
}

/// Dispute persistence.
///
/// `update_if_status` is the concurrency primitive: the store applies the
/// write only while the stored status still equals `expected`, so two
/// overlapping escalation runs cannot both win the same transition.
#[async_trait]
pub trait DisputeStore: Send + Sync {
    async fn insert(&self, dispute: Dispute) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Dispute>>;
    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Dispute>>;
    /// Disputes whose response clock has lapsed with no recorded response.
    async fn list_escalation_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Dispute>>;
    async fn update_if_status(
        &self,
        dispute: Dispute,
        expected: DisputeStatus,
    ) -> Result<UpdateOutcome>;
}

/// Fire-and-forget transition notification (client email, portal event).
///
/// Implementations swallow their own failures; a notification outage must
/// never fail a transition.
#[async_trait]
pub trait TransitionNotifier: Send + Sync {
    async fn notify(&self, dispute: &Dispute, from: DisputeStatus);
}

/// Default notifier: logs and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl TransitionNotifier for LogNotifier {
    async fn notify(&self, dispute: &Dispute, from: DisputeStatus) {
        log::debug!(
            "Dispute {} transitioned {} -> {}",
            dispute.id,
            from.as_str(),
            dispute.status.as_str()
        );
    }
}
