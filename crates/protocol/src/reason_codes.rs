use crate::vocab::Methodology;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Risk classification of a reason code.
///
/// The tier determines whether supporting documentation is required before a
/// letter may be generated. Tier membership is an external contract: the
/// operator UI renders warnings straight off it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// No evidence required. Verification requests and Metro 2 format
    /// violations assert nothing about the consumer's own conduct.
    Factual,
    /// Evidence recommended but non-blocking.
    Situational,
    /// Evidence required. Ownership-denial claims carry real legal risk when
    /// asserted without support.
    OwnershipClaim,
}

impl RiskTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Situational => "situational",
            Self::OwnershipClaim => "ownership_claim",
        }
    }
}

/// Codes the selector appends automatically on round >= 2 when the prior
/// round's clock expired with no bureau response.
pub const AUTO_ESCALATION_CODES: [&str; 2] = ["no_response", "inadequate_verification"];

const FACTUAL_CODES: &[&str] = &[
    "verify_account",
    "metro2_violation",
    "incorrect_balance",
    "incorrect_dates",
    "obsolete",
    "fcra_violation",
    "fdcpa_violation",
    "verification_method_request",
    "debt_validation_request",
    "no_response",
    "inadequate_verification",
];

const SITUATIONAL_CODES: &[&str] = &[
    "paid_in_full",
    "settled",
    "duplicate",
    "account_closed_by_consumer",
    "goodwill_adjustment",
];

const OWNERSHIP_CODES: &[&str] = &[
    "not_mine",
    "identity_theft",
    "never_late",
    "unauthorized_inquiry",
];

/// Tier lookup for a reason code.
///
/// Codes outside the curated set default to [`RiskTier::Situational`]: they
/// warn but never block, and are never silently dropped.
#[must_use]
pub fn reason_tier(code: &str) -> RiskTier {
    if FACTUAL_CODES.contains(&code) {
        RiskTier::Factual
    } else if OWNERSHIP_CODES.contains(&code) {
        RiskTier::OwnershipClaim
    } else {
        // Curated situational codes and anything unrecognized share the
        // warn-only tier.
        RiskTier::Situational
    }
}

/// Document types expected for an ownership-claim code.
///
/// Returned lists are what the evidence gate reports back when the code is
/// asserted without any attached document.
#[must_use]
pub fn required_documents(code: &str) -> &'static [&'static str] {
    match code {
        "identity_theft" => &["police_report", "ftc_identity_theft_affidavit"],
        "not_mine" => &["government_id", "proof_of_address"],
        "never_late" => &["payment_records", "bank_statements"],
        "unauthorized_inquiry" => &["ftc_identity_theft_affidavit"],
        _ => &[],
    }
}

/// Reason codes intrinsic to a methodology, in letter order.
#[must_use]
pub fn intrinsic_reason_codes(methodology: Methodology) -> &'static [&'static str] {
    match methodology {
        Methodology::Factual => &["verify_account"],
        Methodology::Metro2Compliance => &["metro2_violation"],
        Methodology::ConsumerLaw => &["fcra_violation", "fdcpa_violation"],
        Methodology::MethodOfVerification => &["verification_method_request"],
        Methodology::DebtValidation => &["debt_validation_request"],
        Methodology::Goodwill => &["goodwill_adjustment"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ownership_codes_require_documents() {
        for code in OWNERSHIP_CODES {
            assert_eq!(reason_tier(code), RiskTier::OwnershipClaim);
            assert!(
                !required_documents(code).is_empty(),
                "{code} must name expected documents"
            );
        }
    }

    #[test]
    fn factual_codes_never_require_documents() {
        for code in FACTUAL_CODES {
            assert_eq!(reason_tier(code), RiskTier::Factual);
            assert!(required_documents(code).is_empty());
        }
    }

    #[test]
    fn unknown_codes_default_to_situational() {
        assert_eq!(reason_tier("totally_new_code"), RiskTier::Situational);
        assert!(required_documents("totally_new_code").is_empty());
    }

    #[test]
    fn every_methodology_has_intrinsic_codes() {
        for methodology in Methodology::ALL {
            assert!(!intrinsic_reason_codes(methodology).is_empty());
        }
    }

    #[test]
    fn auto_escalation_codes_are_factual_tier() {
        for code in AUTO_ESCALATION_CODES {
            assert_eq!(reason_tier(code), RiskTier::Factual);
        }
    }
}
