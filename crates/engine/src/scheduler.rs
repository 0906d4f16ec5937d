use crate::collaborators::{DisputeStore, TransitionNotifier, UpdateOutcome};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::lifecycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of one scheduler pass, serialized for operator visibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerReport {
    pub scanned: usize,
    pub escalated: usize,
    /// Candidates another run escalated first; converged as a no-op.
    pub already_escalated: usize,
    pub failed: usize,
    pub redrafted: usize,
    #[serde(default)]
    pub failures: Vec<SchedulerFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerFailure {
    pub dispute_id: Uuid,
    pub reason: String,
}

/// Time-driven escalation over the whole store.
///
/// Externally invoked (cron, queue consumer) with an explicit `now` — there
/// is no internal timer, which keeps the pass trivially testable with a
/// controlled clock. Idempotence is keyed on status: once a dispute is
/// `escalated` the candidate predicate no longer matches, and the store's
/// conditional write resolves the race between overlapping runs.
pub struct EscalationScheduler {
    store: Arc<dyn DisputeStore>,
    notifier: Arc<dyn TransitionNotifier>,
    config: EngineConfig,
}

impl EscalationScheduler {
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

    /// Advance every eligible dispute past its lapsed response deadline.
    ///
    /// A failing record is logged and skipped; the batch always runs to
    /// completion. Only the initial candidate scan can fail the pass as a
    /// whole (nothing has been written at that point, so the next tick simply
    /// retries).
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SchedulerReport> {
        let candidates = self.store.list_escalation_candidates(now).await?;
        let mut report = SchedulerReport {
            scanned: candidates.len(),
            ..SchedulerReport::default()
        };
        log::info!(
            "Escalation pass at {now}: {} candidate(s)",
            candidates.len()
        );

        for dispute in candidates {
            // The store predicate already filtered, but the record may have
            // changed between scan and write; re-check before transitioning.
            if !dispute.escalation_due(now) {
                report.already_escalated += 1;
                continue;
            }
            let from = dispute.status;
            let mut updated = dispute.clone();
            if let Err(err) = lifecycle::escalate(&mut updated, now) {
                report.failed += 1;
                report.failures.push(SchedulerFailure {
                    dispute_id: dispute.id,
                    reason: err.to_string(),
                });
                log::warn!("Skipping dispute {}: {err}", dispute.id);
                continue;
            }
            match self.store.update_if_status(updated.clone(), from).await {
                Ok(UpdateOutcome::Applied) => {
                    report.escalated += 1;
                    self.notifier.notify(&updated, from).await;
                    if self.config.auto_redraft {
                        self.redraft(&updated, now, &mut report).await;
                    }
                }
                Ok(UpdateOutcome::StaleStatus(actual)) => {
                    // A concurrent run won the transition; converge silently.
                    log::debug!(
                        "Dispute {} already moved to {} by a concurrent run",
                        dispute.id,
                        actual.as_str()
                    );
                    report.already_escalated += 1;
                }
                Err(err) => {
                    report.failed += 1;
                    report.failures.push(SchedulerFailure {
                        dispute_id: dispute.id,
                        reason: err.to_string(),
                    });
                    log::warn!("Failed to escalate dispute {}: {err}", dispute.id);
                }
            }
        }

        log::info!(
            "Escalation pass done: {} escalated, {} already escalated, {} failed",
            report.escalated,
            report.already_escalated,
            report.failed
        );
        Ok(report)
    }

    async fn redraft(
        &self,
        escalated: &redress_protocol::Dispute,
        now: DateTime<Utc>,
        report: &mut SchedulerReport,
    ) {
        let next = lifecycle::next_round_draft(escalated, now);
        match self.store.insert(next).await {
            Ok(()) => report.redrafted += 1,
            Err(err) => {
                // The escalation itself already committed; the missing draft
                // is recoverable by a manual compose at the next round.
                log::warn!(
                    "Escalated dispute {} but failed to insert round {} draft: {err}",
                    escalated.id,
                    escalated.round + 1
                );
                report.failed += 1;
                report.failures.push(SchedulerFailure {
                    dispute_id: escalated.id,
                    reason: format!("redraft insert failed: {err}"),
                });
            }
        }
    }
}
