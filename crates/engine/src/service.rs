use crate::collaborators::{DisputeStore, TransitionNotifier, UpdateOutcome};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::lifecycle;
use chrono::{DateTime, Utc};
use redress_protocol::{Dispute, Outcome};
use std::sync::Arc;
use uuid::Uuid;

/// Operator-driven lifecycle transitions over the store.
///
/// Each call is a fetch, a pure transition, and a conditional write keyed on
/// the status that was read — a concurrent mutation surfaces as
/// [`EngineError::StaleWrite`] instead of silently overwriting it.
pub struct DisputeService {
    store: Arc<dyn DisputeStore>,
    notifier: Arc<dyn TransitionNotifier>,
    config: EngineConfig,
}

impl DisputeService {
    #[must_use]
    pub fn new(
        store: Arc<dyn DisputeStore>,
        notifier: Arc<dyn TransitionNotifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    pub async fn mark_ready(&self, id: Uuid, now: DateTime<Utc>) -> Result<Dispute> {
        self.transition(id, |dispute| lifecycle::mark_ready(dispute, now))
            .await
    }

    pub async fn send(&self, id: Uuid, sent_at: DateTime<Utc>) -> Result<Dispute> {
        let config = self.config.clone();
        self.transition(id, move |dispute| {
            lifecycle::mark_sent(dispute, sent_at, &config)
        })
        .await
    }

    pub async fn acknowledge(&self, id: Uuid, now: DateTime<Utc>) -> Result<Dispute> {
        self.transition(id, move |dispute| lifecycle::mark_in_progress(dispute, now))
            .await
    }

    pub async fn record_response(
        &self,
        id: Uuid,
        received_at: DateTime<Utc>,
        outcome: Outcome,
    ) -> Result<Dispute> {
        self.transition(id, move |dispute| {
            lifecycle::record_response(dispute, received_at, outcome)
        })
        .await
    }

    pub async fn resolve(&self, id: Uuid, now: DateTime<Utc>) -> Result<Dispute> {
        self.transition(id, move |dispute| lifecycle::mark_resolved(dispute, now))
            .await
    }

    async fn transition(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut Dispute) -> Result<()>,
    ) -> Result<Dispute> {
        let Some(mut dispute) = self.store.get(id).await? else {
            return Err(EngineError::DisputeNotFound(id));
        };
        let from = dispute.status;
        apply(&mut dispute)?;
        match self
            .store
            .update_if_status(dispute.clone(), from)
            .await?
        {
            UpdateOutcome::Applied => {
                self.notifier.notify(&dispute, from).await;
                Ok(dispute)
            }
            UpdateOutcome::StaleStatus(actual) => Err(EngineError::StaleWrite { id, actual }),
        }
    }
}
