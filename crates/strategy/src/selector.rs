use crate::advisory::{AdvisorySuggestion, ViolationAnnotation};
use crate::error::{Result, StrategyError};
use redress_protocol::{
    intrinsic_reason_codes, DisputeStatus, ItemType, Methodology, NegativeItem, Outcome,
    AUTO_ESCALATION_CODES,
};
use serde::{Deserialize, Serialize};

/// Minimum classifier confidence at which an advisory methodology displaces
/// the rule-based choice.
pub const ADVISORY_ACCEPTANCE_THRESHOLD: f64 = 0.75;

/// How the methodology was chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    RuleBased,
    Advisory,
}

/// Transient output of strategy selection; lives for one generation request
/// and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisputeStrategy {
    pub methodology: Methodology,
    pub reason_codes: Vec<String>,
    pub violations: Vec<ViolationAnnotation>,
    /// In [0, 1]; 1.0 for rule-based selections.
    pub confidence: f64,
    pub provenance: Provenance,
}

/// What happened to the previous round of this escalation chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorRoundOutcome {
    pub round: u32,
    pub status: DisputeStatus,
    pub outcome: Option<Outcome>,
    pub responded: bool,
    pub deadline_lapsed: bool,
}

impl PriorRoundOutcome {
    /// The prior letter went out, the statutory window closed, and nothing
    /// came back.
    #[must_use]
    pub fn expired_unanswered(&self) -> bool {
        !self.responded
            && self.deadline_lapsed
            && matches!(
                self.status,
                DisputeStatus::Sent | DisputeStatus::InProgress | DisputeStatus::Escalated
            )
    }
}

/// Choose a dispute methodology and reason codes for one generation request.
///
/// Pure over its inputs. Rules in priority order: collections on the first
/// round get a debt-validation demand, any later round becomes a
/// method-of-verification challenge, everything else is a factual dispute. An
/// advisory suggestion displaces the rule-based choice only when its parsed
/// methodology is valid and its confidence clears
/// [`ADVISORY_ACCEPTANCE_THRESHOLD`]; raw classifier output is never trusted
/// blindly.
pub fn select_strategy(
    items: &[NegativeItem],
    round: u32,
    prior_outcomes: &[PriorRoundOutcome],
    operator_codes: &[String],
    advisory: Option<&AdvisorySuggestion>,
) -> Result<DisputeStrategy> {
    if items.is_empty() {
        return Err(StrategyError::EmptySelection);
    }

    let rule_based = rule_based_methodology(items, round);
    let (methodology, confidence, provenance) = match advisory.and_then(validate_advisory) {
        Some((suggested, confidence)) if confidence >= ADVISORY_ACCEPTANCE_THRESHOLD => {
            log::debug!(
                "Accepting advisory methodology {} (confidence {:.2})",
                suggested.as_str(),
                confidence
            );
            (suggested, confidence, Provenance::Advisory)
        }
        Some((suggested, confidence)) => {
            log::debug!(
                "Rejecting advisory methodology {} (confidence {:.2} below threshold); \
                 falling back to {}",
                suggested.as_str(),
                confidence,
                rule_based.as_str()
            );
            (rule_based, 1.0, Provenance::RuleBased)
        }
        None => (rule_based, 1.0, Provenance::RuleBased),
    };

    let mut reason_codes: Vec<String> = Vec::new();
    for code in intrinsic_reason_codes(methodology) {
        push_unique(&mut reason_codes, code);
    }
    for code in operator_codes {
        push_unique(&mut reason_codes, code);
    }
    if round >= 2 {
        let [no_response, inadequate_verification] = AUTO_ESCALATION_CODES;
        if let Some(prior) = prior_outcomes.iter().find(|p| p.round == round - 1) {
            if prior.expired_unanswered() {
                push_unique(&mut reason_codes, no_response);
            } else if prior.outcome == Some(Outcome::Verified) {
                push_unique(&mut reason_codes, inadequate_verification);
            }
        }
    }

    let violations = advisory.map(|a| a.violations.clone()).unwrap_or_default();

    Ok(DisputeStrategy {
        methodology,
        reason_codes,
        violations,
        confidence,
        provenance,
    })
}

fn rule_based_methodology(items: &[NegativeItem], round: u32) -> Methodology {
    let has_collection = items.iter().any(|i| i.item_type == ItemType::Collection);
    if has_collection && round == 1 {
        return Methodology::DebtValidation;
    }
    if round >= 2 {
        return Methodology::MethodOfVerification;
    }
    Methodology::Factual
}

/// Parse and bound the advisory payload. A methodology outside the closed
/// enumeration or a non-finite confidence invalidates the suggestion.
fn validate_advisory(advisory: &AdvisorySuggestion) -> Option<(Methodology, f64)> {
    let methodology: Methodology = match advisory.methodology.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("Discarding advisory suggestion: {err}");
            return None;
        }
    };
    if !advisory.confidence.is_finite() {
        log::warn!("Discarding advisory suggestion: non-finite confidence");
        return None;
    }
    Some((methodology, advisory.confidence.clamp(0.0, 1.0)))
}

fn push_unique(codes: &mut Vec<String>, code: &str) {
    if !codes.iter().any(|existing| existing == code) {
        codes.push(code.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use redress_protocol::{BureauPresence, Severity};
    use uuid::Uuid;

    fn item(item_type: ItemType) -> NegativeItem {
        NegativeItem {
            id: Uuid::new_v4(),
            creditor: "Acme Recovery".to_string(),
            item_type,
            amount_cents: 125_00,
            bureaus: BureauPresence {
                trans_union: true,
                experian: true,
                equifax: true,
            },
            bureau: None,
            reported_status: None,
            date_reported: None,
            severity: Severity::Medium,
        }
    }

    fn expired_prior(round: u32) -> PriorRoundOutcome {
        PriorRoundOutcome {
            round,
            status: DisputeStatus::Escalated,
            outcome: None,
            responded: false,
            deadline_lapsed: true,
        }
    }

    #[test]
    fn empty_selection_is_an_error() {
        let err = select_strategy(&[], 1, &[], &[], None).unwrap_err();
        assert_eq!(err, StrategyError::EmptySelection);
    }

    #[test]
    fn collection_round_one_prefers_debt_validation() {
        let strategy =
            select_strategy(&[item(ItemType::Collection)], 1, &[], &[], None).unwrap();
        assert_eq!(strategy.methodology, Methodology::DebtValidation);
        assert_eq!(strategy.provenance, Provenance::RuleBased);
        assert_eq!(strategy.confidence, 1.0);
    }

    #[test]
    fn round_two_prefers_method_of_verification_even_for_collections() {
        let strategy =
            select_strategy(&[item(ItemType::Collection)], 2, &[], &[], None).unwrap();
        assert_eq!(strategy.methodology, Methodology::MethodOfVerification);
    }

    #[test]
    fn default_is_factual() {
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 1, &[], &[], None).unwrap();
        assert_eq!(strategy.methodology, Methodology::Factual);
        assert_eq!(strategy.reason_codes, vec!["verify_account"]);
    }

    #[test]
    fn advisory_above_threshold_is_accepted() {
        let advisory = AdvisorySuggestion {
            methodology: "metro2_compliance".to_string(),
            confidence: 0.9,
            violations: Vec::new(),
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 1, &[], &[], Some(&advisory))
                .unwrap();
        assert_eq!(strategy.methodology, Methodology::Metro2Compliance);
        assert_eq!(strategy.provenance, Provenance::Advisory);
        assert_eq!(strategy.confidence, 0.9);
    }

    #[test]
    fn advisory_below_threshold_falls_back_to_rules() {
        let advisory = AdvisorySuggestion {
            methodology: "metro2_compliance".to_string(),
            confidence: 0.5,
            violations: Vec::new(),
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 1, &[], &[], Some(&advisory))
                .unwrap();
        assert_eq!(strategy.methodology, Methodology::Factual);
        assert_eq!(strategy.provenance, Provenance::RuleBased);
    }

    #[test]
    fn advisory_with_unknown_methodology_is_discarded() {
        let advisory = AdvisorySuggestion {
            methodology: "voodoo".to_string(),
            confidence: 0.99,
            violations: Vec::new(),
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 1, &[], &[], Some(&advisory))
                .unwrap();
        assert_eq!(strategy.methodology, Methodology::Factual);
    }

    #[test]
    fn advisory_violations_are_carried_even_when_rejected() {
        let advisory = AdvisorySuggestion {
            methodology: "metro2_compliance".to_string(),
            confidence: 0.1,
            violations: vec![ViolationAnnotation {
                item_id: Uuid::new_v4(),
                code: "status_date_conflict".to_string(),
                description: "Account status conflicts with date of last payment".to_string(),
            }],
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 1, &[], &[], Some(&advisory))
                .unwrap();
        assert_eq!(strategy.violations.len(), 1);
    }

    #[test]
    fn operator_codes_are_appended_after_intrinsic() {
        let strategy = select_strategy(
            &[item(ItemType::LatePayment)],
            1,
            &[],
            &["never_late".to_string(), "verify_account".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(strategy.reason_codes, vec!["verify_account", "never_late"]);
    }

    #[test]
    fn expired_unanswered_prior_round_adds_no_response() {
        let strategy = select_strategy(
            &[item(ItemType::LatePayment)],
            2,
            &[expired_prior(1)],
            &[],
            None,
        )
        .unwrap();
        assert!(strategy
            .reason_codes
            .iter()
            .any(|code| code == "no_response"));
    }

    #[test]
    fn verified_prior_round_adds_inadequate_verification() {
        let prior = PriorRoundOutcome {
            round: 1,
            status: DisputeStatus::Responded,
            outcome: Some(Outcome::Verified),
            responded: true,
            deadline_lapsed: true,
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 2, &[prior], &[], None).unwrap();
        assert!(strategy
            .reason_codes
            .iter()
            .any(|code| code == "inadequate_verification"));
        assert!(!strategy.reason_codes.iter().any(|c| c == "no_response"));
    }

    #[test]
    fn answered_prior_round_adds_no_escalation_codes() {
        let prior = PriorRoundOutcome {
            round: 1,
            status: DisputeStatus::Responded,
            outcome: Some(Outcome::Updated),
            responded: true,
            deadline_lapsed: true,
        };
        let strategy =
            select_strategy(&[item(ItemType::LatePayment)], 2, &[prior], &[], None).unwrap();
        assert!(!strategy.reason_codes.iter().any(|c| c == "no_response"));
        assert!(!strategy
            .reason_codes
            .iter()
            .any(|c| c == "inadequate_verification"));
    }
}
