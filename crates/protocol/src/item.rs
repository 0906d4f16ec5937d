use crate::vocab::{Bureau, ItemType};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reporting severity assigned by the ingestion pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Which bureaus currently report an item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct BureauPresence {
    #[serde(default)]
    pub trans_union: bool,
    #[serde(default)]
    pub experian: bool,
    #[serde(default)]
    pub equifax: bool,
}

impl BureauPresence {
    #[must_use]
    pub const fn on(self, bureau: Bureau) -> bool {
        match bureau {
            Bureau::TransUnion => self.trans_union,
            Bureau::Experian => self.experian,
            Bureau::Equifax => self.equifax,
        }
    }

    #[must_use]
    pub const fn any(self) -> bool {
        self.trans_union || self.experian || self.equifax
    }
}

/// A derogatory account parsed from a client's credit report.
///
/// Owned by the ingestion pipeline; immutable once parsed and read-only to the
/// engine. Records imported before per-bureau tracking carry no presence flags
/// and instead keep the legacy single `bureau` field ("combined" means all
/// three).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NegativeItem {
    pub id: Uuid,
    pub creditor: String,
    pub item_type: ItemType,
    /// Reported balance in cents.
    pub amount_cents: i64,
    #[serde(default)]
    pub bureaus: BureauPresence,
    /// Legacy single-bureau field for records predating per-bureau flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bureau: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_reported: Option<NaiveDate>,
    pub severity: Severity,
}

impl NegativeItem {
    /// Whether this item should appear in a letter targeting `bureau`.
    ///
    /// Per-bureau flags win when any is set; legacy records match on the
    /// single `bureau` field, with "combined" acting as a wildcard.
    #[must_use]
    pub fn reported_on(&self, bureau: Bureau) -> bool {
        if self.bureaus.any() {
            return self.bureaus.on(bureau);
        }
        match self.bureau.as_deref() {
            Some(raw) => {
                let raw = raw.trim();
                raw.eq_ignore_ascii_case("combined")
                    || raw
                        .parse::<Bureau>()
                        .is_ok_and(|parsed| parsed == bureau)
            }
            None => false,
        }
    }

    #[must_use]
    pub fn amount_display(&self) -> String {
        format!("${}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }
}

/// Reference to an uploaded evidence file.
///
/// Storage and content live in the client's document store; the engine reads
/// only the identifier and declared type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct EvidenceDocument {
    pub id: Uuid,
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::ItemType;
    use pretty_assertions::assert_eq;

    fn item(bureaus: BureauPresence, legacy: Option<&str>) -> NegativeItem {
        NegativeItem {
            id: Uuid::new_v4(),
            creditor: "Midland Credit".to_string(),
            item_type: ItemType::Collection,
            amount_cents: 48_250,
            bureaus,
            bureau: legacy.map(str::to_string),
            reported_status: None,
            date_reported: None,
            severity: Severity::High,
        }
    }

    #[test]
    fn presence_flags_take_precedence() {
        let item = item(
            BureauPresence {
                trans_union: true,
                ..BureauPresence::default()
            },
            Some("equifax"),
        );
        assert!(item.reported_on(Bureau::TransUnion));
        assert!(!item.reported_on(Bureau::Equifax));
    }

    #[test]
    fn legacy_field_matches_when_no_flags() {
        let item = item(BureauPresence::default(), Some("equifax"));
        assert!(item.reported_on(Bureau::Equifax));
        assert!(!item.reported_on(Bureau::Experian));
    }

    #[test]
    fn legacy_combined_matches_all_bureaus() {
        let item = item(BureauPresence::default(), Some("combined"));
        for bureau in Bureau::ALL {
            assert!(item.reported_on(bureau));
        }
    }

    #[test]
    fn no_flags_and_no_legacy_field_matches_nothing() {
        let item = item(BureauPresence::default(), None);
        for bureau in Bureau::ALL {
            assert!(!item.reported_on(bureau));
        }
    }

    #[test]
    fn amount_renders_dollars_and_cents() {
        let item = item(BureauPresence::default(), None);
        assert_eq!(item.amount_display(), "$482.50");
    }
}
