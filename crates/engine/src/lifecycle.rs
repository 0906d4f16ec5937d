use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use redress_protocol::{Dispute, DisputeStatus, EscalationRecord, Outcome};
use uuid::Uuid;

fn check_transition(dispute: &Dispute, to: DisputeStatus) -> Result<()> {
    if DisputeStatus::can_transition(dispute.status, to) {
        Ok(())
    } else {
        Err(EngineError::IllegalTransition {
            from: dispute.status,
            to,
        })
    }
}

/// `draft -> ready`: the operator reviewed the letter.
pub fn mark_ready(dispute: &mut Dispute, now: DateTime<Utc>) -> Result<()> {
    check_transition(dispute, DisputeStatus::Ready)?;
    dispute.status = DisputeStatus::Ready;
    dispute.updated_at = now;
    Ok(())
}

/// `draft/ready -> sent`: the letter went to the mail house.
///
/// Starts the response clock: `response_deadline = sent_at + window` and
/// `escalation_ready_at = response_deadline` — escalation becomes eligible
/// exactly when the statutory window lapses, not before.
pub fn mark_sent(dispute: &mut Dispute, sent_at: DateTime<Utc>, config: &EngineConfig) -> Result<()> {
    check_transition(dispute, DisputeStatus::Sent)?;
    if dispute.letter_body.trim().is_empty() {
        return Err(EngineError::EmptyLetterBody);
    }
    let deadline = sent_at + config.response_window();
    dispute.status = DisputeStatus::Sent;
    dispute.sent_at = Some(sent_at);
    dispute.response_deadline = Some(deadline);
    dispute.escalation_ready_at = Some(deadline);
    dispute.updated_at = sent_at;
    log::info!(
        "Dispute {} sent; response deadline {}",
        dispute.id,
        deadline
    );
    Ok(())
}

/// `sent -> in_progress`: the bureau acknowledged receipt. The clock keeps
/// running from the original deadline.
pub fn mark_in_progress(dispute: &mut Dispute, now: DateTime<Utc>) -> Result<()> {
    check_transition(dispute, DisputeStatus::InProgress)?;
    dispute.status = DisputeStatus::InProgress;
    dispute.updated_at = now;
    Ok(())
}

/// `sent/in_progress -> responded`: a bureau reply was recorded.
///
/// Short-circuits the clock; once `response_received_at` is set the scheduler
/// no longer touches the record.
pub fn record_response(
    dispute: &mut Dispute,
    received_at: DateTime<Utc>,
    outcome: Outcome,
) -> Result<()> {
    check_transition(dispute, DisputeStatus::Responded)?;
    dispute.status = DisputeStatus::Responded;
    dispute.response_received_at = Some(received_at);
    dispute.outcome = Some(outcome);
    dispute.updated_at = received_at;
    Ok(())
}

/// `responded -> resolved`: the outcome was accepted and the chain closed.
pub fn mark_resolved(dispute: &mut Dispute, now: DateTime<Utc>) -> Result<()> {
    check_transition(dispute, DisputeStatus::Resolved)?;
    dispute.status = DisputeStatus::Resolved;
    dispute.updated_at = now;
    Ok(())
}

/// `sent/in_progress -> escalated`: the window lapsed with no response.
///
/// Appends exactly one history record; the caller (scheduler) guarantees
/// idempotence through the store's conditional write.
pub fn escalate(dispute: &mut Dispute, now: DateTime<Utc>) -> Result<()> {
    check_transition(dispute, DisputeStatus::Escalated)?;
    dispute.escalation_history.push(EscalationRecord {
        escalated_at: now,
        from_status: dispute.status,
    });
    dispute.status = DisputeStatus::Escalated;
    dispute.outcome.get_or_insert(Outcome::NoResponse);
    dispute.updated_at = now;
    Ok(())
}

/// Re-entry dispute for the next round of an escalated chain.
///
/// A fresh `draft` at `round + 1` carrying the same client, items, and
/// bureau; letter content is regenerated by a new compose pass, so the body
/// starts empty. Round monotonicity across the chain follows from `round + 1`.
#[must_use]
pub fn next_round_draft(escalated: &Dispute, now: DateTime<Utc>) -> Dispute {
    Dispute {
        schema_version: escalated.schema_version,
        id: Uuid::new_v4(),
        client_id: escalated.client_id,
        item_ids: escalated.item_ids.clone(),
        bureau: escalated.bureau,
        round: escalated.round + 1,
        methodology: escalated.methodology,
        reason_codes: Vec::new(),
        letter_body: String::new(),
        letter_fingerprint: String::new(),
        template_fingerprint: None,
        status: DisputeStatus::Draft,
        sent_at: None,
        response_deadline: None,
        escalation_ready_at: None,
        response_received_at: None,
        outcome: None,
        evidence_override: false,
        escalation_history: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use redress_protocol::{Bureau, Methodology};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    fn draft() -> Dispute {
        Dispute {
            schema_version: 1,
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            item_ids: vec![Uuid::new_v4()],
            bureau: Bureau::TransUnion,
            round: 1,
            methodology: Methodology::Factual,
            reason_codes: vec!["verify_account".to_string()],
            letter_body: "Dear TransUnion...".to_string(),
            letter_fingerprint: "abc".to_string(),
            template_fingerprint: None,
            status: DisputeStatus::Draft,
            sent_at: None,
            response_deadline: None,
            escalation_ready_at: None,
            response_received_at: None,
            outcome: None,
            evidence_override: false,
            escalation_history: Vec::new(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn sending_sets_both_clock_fields_to_the_same_instant() {
        let mut d = draft();
        mark_sent(&mut d, now(), &EngineConfig::default()).unwrap();
        let deadline = now() + chrono::Duration::days(30);
        assert_eq!(d.status, DisputeStatus::Sent);
        assert_eq!(d.sent_at, Some(now()));
        assert_eq!(d.response_deadline, Some(deadline));
        assert_eq!(d.escalation_ready_at, Some(deadline));
    }

    #[test]
    fn sending_an_empty_letter_fails() {
        let mut d = draft();
        d.letter_body = "   ".to_string();
        let err = mark_sent(&mut d, now(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyLetterBody));
        assert_eq!(d.status, DisputeStatus::Draft);
    }

    #[test]
    fn responding_twice_is_illegal() {
        let mut d = draft();
        mark_sent(&mut d, now(), &EngineConfig::default()).unwrap();
        record_response(&mut d, now(), Outcome::Deleted).unwrap();
        let err = record_response(&mut d, now(), Outcome::Verified).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn escalation_appends_one_history_record() {
        let mut d = draft();
        mark_sent(&mut d, now(), &EngineConfig::default()).unwrap();
        escalate(&mut d, now() + chrono::Duration::days(31)).unwrap();
        assert_eq!(d.status, DisputeStatus::Escalated);
        assert_eq!(d.escalation_history.len(), 1);
        assert_eq!(d.escalation_history[0].from_status, DisputeStatus::Sent);
        assert_eq!(d.outcome, Some(Outcome::NoResponse));
    }

    #[test]
    fn escalating_a_draft_is_illegal() {
        let mut d = draft();
        let err = escalate(&mut d, now()).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
        assert!(d.escalation_history.is_empty());
    }

    #[test]
    fn next_round_draft_bumps_round_and_resets_clock() {
        let mut d = draft();
        mark_sent(&mut d, now(), &EngineConfig::default()).unwrap();
        escalate(&mut d, now() + chrono::Duration::days(31)).unwrap();
        let next = next_round_draft(&d, now() + chrono::Duration::days(31));
        assert_eq!(next.round, 2);
        assert_eq!(next.status, DisputeStatus::Draft);
        assert_eq!(next.item_ids, d.item_ids);
        assert!(next.letter_body.is_empty());
        assert!(next.response_deadline.is_none());
        assert!(next.escalation_history.is_empty());
    }
}
