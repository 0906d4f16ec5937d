use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VocabError {
    #[error("Unknown bureau '{0}'")]
    UnknownBureau(String),

    #[error("Unknown methodology '{0}'")]
    UnknownMethodology(String),

    #[error("Unknown item type '{0}'")]
    UnknownItemType(String),
}

/// The three credit-reporting agencies a dispute can target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bureau {
    TransUnion,
    Experian,
    Equifax,
}

impl Bureau {
    pub const ALL: [Self; 3] = [Self::TransUnion, Self::Experian, Self::Equifax];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransUnion => "trans_union",
            Self::Experian => "experian",
            Self::Equifax => "equifax",
        }
    }

    /// Human-facing name as printed in letter bodies and envelopes.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TransUnion => "TransUnion",
            Self::Experian => "Experian",
            Self::Equifax => "Equifax",
        }
    }
}

impl FromStr for Bureau {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trans_union" | "transunion" | "tu" => Ok(Self::TransUnion),
            "experian" | "ex" => Ok(Self::Experian),
            "equifax" | "eq" => Ok(Self::Equifax),
            other => Err(VocabError::UnknownBureau(other.to_string())),
        }
    }
}

/// Addressee class for a letter template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Bureau,
    Creditor,
    Collector,
}

impl Recipient {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bureau => "bureau",
            Self::Creditor => "creditor",
            Self::Collector => "collector",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Collection,
    ChargeOff,
    LatePayment,
    Inquiry,
    PublicRecord,
    Repossession,
    Other,
}

impl ItemType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::ChargeOff => "charge_off",
            Self::LatePayment => "late_payment",
            Self::Inquiry => "inquiry",
            Self::PublicRecord => "public_record",
            Self::Repossession => "repossession",
            Self::Other => "other",
        }
    }
}

impl FromStr for ItemType {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collection" => Ok(Self::Collection),
            "charge_off" => Ok(Self::ChargeOff),
            "late_payment" => Ok(Self::LatePayment),
            "inquiry" => Ok(Self::Inquiry),
            "public_record" => Ok(Self::PublicRecord),
            "repossession" => Ok(Self::Repossession),
            "other" => Ok(Self::Other),
            other => Err(VocabError::UnknownItemType(other.to_string())),
        }
    }
}

/// The overall legal/strategic approach of a dispute letter.
///
/// This is a closed enumeration; advisory classifier output is parsed against
/// it and rejected when it names anything else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    Factual,
    Metro2Compliance,
    ConsumerLaw,
    MethodOfVerification,
    DebtValidation,
    Goodwill,
}

impl Methodology {
    pub const ALL: [Self; 6] = [
        Self::Factual,
        Self::Metro2Compliance,
        Self::ConsumerLaw,
        Self::MethodOfVerification,
        Self::DebtValidation,
        Self::Goodwill,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Metro2Compliance => "metro2_compliance",
            Self::ConsumerLaw => "consumer_law",
            Self::MethodOfVerification => "method_of_verification",
            Self::DebtValidation => "debt_validation",
            Self::Goodwill => "goodwill",
        }
    }
}

impl FromStr for Methodology {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "factual" => Ok(Self::Factual),
            "metro2_compliance" | "metro2" => Ok(Self::Metro2Compliance),
            "consumer_law" => Ok(Self::ConsumerLaw),
            "method_of_verification" | "mov" => Ok(Self::MethodOfVerification),
            "debt_validation" => Ok(Self::DebtValidation),
            "goodwill" => Ok(Self::Goodwill),
            other => Err(VocabError::UnknownMethodology(other.to_string())),
        }
    }
}

/// Recorded result of a dispute once the bureau (or furnisher) answers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Deleted,
    Verified,
    Updated,
    NoResponse,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Verified => "verified",
            Self::Updated => "updated",
            Self::NoResponse => "no_response",
        }
    }
}

/// Lifecycle state of a dispute record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Draft,
    Ready,
    Sent,
    InProgress,
    Responded,
    Resolved,
    Escalated,
}

impl DisputeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Sent => "sent",
            Self::InProgress => "in_progress",
            Self::Responded => "responded",
            Self::Resolved => "resolved",
            Self::Escalated => "escalated",
        }
    }

    /// Whether the response clock is live for this status.
    ///
    /// Only disputes in a clock-live status are eligible for automatic
    /// escalation; everything else either has no deadline yet or already has a
    /// terminal outcome.
    #[must_use]
    pub const fn clock_running(self) -> bool {
        matches!(self, Self::Sent | Self::InProgress)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Escalated)
    }

    /// Legal state-machine edges.
    #[must_use]
    pub const fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Draft, Self::Ready | Self::Sent)
                | (Self::Ready, Self::Sent)
                | (
                    Self::Sent,
                    Self::InProgress | Self::Responded | Self::Resolved | Self::Escalated
                )
                | (
                    Self::InProgress,
                    Self::Responded | Self::Resolved | Self::Escalated
                )
                | (Self::Responded, Self::Resolved)
        )
    }
}
