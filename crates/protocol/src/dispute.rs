use crate::vocab::{Bureau, DisputeStatus, Methodology, Outcome};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DISPUTE_SCHEMA_VERSION: u32 = 1;

/// One prior status transition in a dispute's escalation chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct EscalationRecord {
    pub escalated_at: DateTime<Utc>,
    pub from_status: DisputeStatus,
}

/// The central persisted entity.
///
/// Created by the letter composer at `draft`, mutated only through lifecycle
/// transitions, never physically deleted (retained for audit). The deadline
/// invariant: `response_deadline` and `escalation_ready_at` are set exactly
/// when the record enters `sent` and stay non-null for every clock-live
/// status after that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Dispute {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub id: Uuid,
    pub client_id: Uuid,
    /// One-to-many when the combined letter policy groups items.
    pub item_ids: Vec<Uuid>,
    pub bureau: Bureau,
    /// Ordinal position in the escalation chain, starting at 1. Monotonically
    /// non-decreasing across re-entries for the same item.
    pub round: u32,
    pub methodology: Methodology,
    pub reason_codes: Vec<String>,
    pub letter_body: String,
    /// SHA-256 over the rendered body, hex-encoded. Ties a mailed letter to
    /// the exact bytes that were generated.
    pub letter_fingerprint: String,
    /// Fingerprint of the template library revision the letter was rendered
    /// from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_fingerprint: Option<String>,
    pub status: DisputeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_ready_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_received_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Set when the operator forced generation past an invalid evidence
    /// report. Audit requirement.
    #[serde(default)]
    pub evidence_override: bool,
    #[serde(default)]
    pub escalation_history: Vec<EscalationRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const fn default_schema_version() -> u32 {
    DISPUTE_SCHEMA_VERSION
}

impl Dispute {
    /// Whether the statutory clock has lapsed with no recorded response.
    #[must_use]
    pub fn escalation_due(&self, now: DateTime<Utc>) -> bool {
        self.status.clock_running()
            && self.response_received_at.is_none()
            && self
                .escalation_ready_at
                .is_some_and(|ready_at| now >= ready_at)
    }
}

/// Evidence-gate verdict for a reason-code selection.
///
/// Serialized for the operator UI; `missing_requirements` drives the blocking
/// dialog and `warnings` the non-blocking banner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub missing_requirements: Vec<MissingRequirement>,
    #[serde(default)]
    pub blocking_reasons: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn passing() -> Self {
        Self {
            valid: true,
            missing_requirements: Vec::new(),
            blocking_reasons: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct MissingRequirement {
    pub reason_code: String,
    pub expected_documents: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn dispute(status: DisputeStatus, ready_at: Option<DateTime<Utc>>) -> Dispute {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Dispute {
            schema_version: DISPUTE_SCHEMA_VERSION,
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            item_ids: vec![Uuid::new_v4()],
            bureau: Bureau::Experian,
            round: 1,
            methodology: Methodology::Factual,
            reason_codes: vec!["verify_account".to_string()],
            letter_body: "body".to_string(),
            letter_fingerprint: String::new(),
            template_fingerprint: None,
            status,
            sent_at: None,
            response_deadline: ready_at,
            escalation_ready_at: ready_at,
            response_received_at: None,
            outcome: None,
            evidence_override: false,
            escalation_history: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn escalation_due_only_after_ready_timestamp() {
        let ready = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let d = dispute(DisputeStatus::Sent, Some(ready));
        assert!(!d.escalation_due(ready - chrono::Duration::seconds(1)));
        assert!(d.escalation_due(ready));
        assert!(d.escalation_due(ready + chrono::Duration::days(2)));
    }

    #[test]
    fn recorded_response_stops_the_clock() {
        let ready = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let mut d = dispute(DisputeStatus::InProgress, Some(ready));
        d.response_received_at = Some(ready - chrono::Duration::days(3));
        assert!(!d.escalation_due(ready + chrono::Duration::days(1)));
    }

    #[test]
    fn drafts_are_never_due() {
        let ready = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let d = dispute(DisputeStatus::Draft, Some(ready));
        assert!(!d.escalation_due(ready + chrono::Duration::days(30)));
    }

    #[test]
    fn dispute_serializes_without_unset_optionals() {
        let d = dispute(DisputeStatus::Draft, None);
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("sent_at").is_none());
        assert!(json.get("outcome").is_none());
        assert_eq!(json["status"], "draft");
    }
}
