use redress_protocol::{Bureau, ItemType, Methodology, Recipient};
use serde::{Deserialize, Serialize};

/// A versioned letter body with its matching filters.
///
/// `min_round`/`max_round` bound the dispute rounds the template applies to
/// (`max_round = None` means open-ended). `item_type` and `bureau` narrow the
/// template further; a template with neither filter is the methodology's
/// generic fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterTemplate {
    pub slug: String,
    pub title: String,
    pub methodology: Methodology,
    pub recipient: Recipient,
    #[serde(default = "default_min_round")]
    pub min_round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bureau: Option<Bureau>,
    pub body: String,
    /// Names the body is expected to reference; mismatches are load-time
    /// warnings, not errors.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Statute citations quoted by the body (e.g. "15 U.S.C. § 1681i").
    #[serde(default)]
    pub legal_citations: Vec<String>,
}

const fn default_min_round() -> u32 {
    1
}

impl LetterTemplate {
    #[must_use]
    pub fn round_applies(&self, round: u32) -> bool {
        round >= self.min_round && self.max_round.is_none_or(|max| round <= max)
    }

    /// Generic templates carry no item-type or bureau filter.
    #[must_use]
    pub const fn is_generic(&self) -> bool {
        self.item_type.is_none() && self.bureau.is_none()
    }

    /// Match score for resolution, `None` when the template does not apply.
    ///
    /// Filters that are present must match and add specificity; absent
    /// filters match anything at zero. Item-type specificity outranks bureau
    /// specificity.
    #[must_use]
    pub fn match_score(&self, query: &TemplateQuery) -> Option<u32> {
        if self.methodology != query.methodology || self.recipient != query.recipient {
            return None;
        }
        if !self.round_applies(query.round) {
            return None;
        }
        let mut score = 0;
        match self.item_type {
            Some(filter) if Some(filter) == query.item_type => score += 2,
            Some(_) => return None,
            None => {}
        }
        match self.bureau {
            Some(filter) if Some(filter) == query.bureau => score += 1,
            Some(_) => return None,
            None => {}
        }
        Some(score)
    }
}

/// Resolution key for one letter unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateQuery {
    pub methodology: Methodology,
    pub recipient: Recipient,
    pub round: u32,
    pub item_type: Option<ItemType>,
    pub bureau: Option<Bureau>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template(item_type: Option<ItemType>, bureau: Option<Bureau>) -> LetterTemplate {
        LetterTemplate {
            slug: "t".to_string(),
            title: "T".to_string(),
            methodology: Methodology::Factual,
            recipient: Recipient::Bureau,
            min_round: 1,
            max_round: None,
            item_type,
            bureau,
            body: "{{client_name}}".to_string(),
            variables: vec!["client_name".to_string()],
            legal_citations: Vec::new(),
        }
    }

    fn query(round: u32) -> TemplateQuery {
        TemplateQuery {
            methodology: Methodology::Factual,
            recipient: Recipient::Bureau,
            round,
            item_type: Some(ItemType::Collection),
            bureau: Some(Bureau::Equifax),
        }
    }

    #[test]
    fn specific_filters_score_higher_than_generic() {
        let generic = template(None, None);
        let by_type = template(Some(ItemType::Collection), None);
        let by_both = template(Some(ItemType::Collection), Some(Bureau::Equifax));
        let q = query(1);
        assert_eq!(generic.match_score(&q), Some(0));
        assert_eq!(by_type.match_score(&q), Some(2));
        assert_eq!(by_both.match_score(&q), Some(3));
    }

    #[test]
    fn mismatched_filter_disqualifies() {
        let wrong_type = template(Some(ItemType::Inquiry), None);
        assert_eq!(wrong_type.match_score(&query(1)), None);
        let wrong_bureau = template(None, Some(Bureau::TransUnion));
        assert_eq!(wrong_bureau.match_score(&query(1)), None);
    }

    #[test]
    fn round_range_is_inclusive() {
        let mut t = template(None, None);
        t.min_round = 2;
        t.max_round = Some(3);
        assert_eq!(t.match_score(&query(1)), None);
        assert!(t.match_score(&query(2)).is_some());
        assert!(t.match_score(&query(3)).is_some());
        assert_eq!(t.match_score(&query(4)), None);
    }

    #[test]
    fn open_ended_max_round_applies_forever() {
        let mut t = template(None, None);
        t.min_round = 2;
        assert!(t.round_applies(9));
    }
}
