use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder SKU the matcher emits when no catalog entry is acceptable.
pub const NO_MATCH_SENTINEL: &str = "NO_MATCH";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkuCandidate {
    pub sku: String,
    pub description: String,
    pub spec_match_percent: Decimal,
    #[serde(default)]
    pub missing_specs: Vec<String>,
    pub justification: String,
}

/// Ranked match outcome for one BOM item: up to three candidates plus the
/// selected SKU (or [`NO_MATCH_SENTINEL`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecommendation {
    pub item_no: String,
    pub rfp_description: String,
    #[serde(default)]
    pub top_candidates: Vec<SkuCandidate>,
    pub selected_sku: String,
    #[serde(default)]
    pub selection_reason: String,
}

impl MatchRecommendation {
    pub fn is_matched(&self) -> bool {
        !self.selected_sku.is_empty() && self.selected_sku != NO_MATCH_SENTINEL
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutput {
    #[serde(default)]
    pub recommendations: Vec<MatchRecommendation>,
}

#[cfg(test)]
mod tests {
    use super::{MatchRecommendation, NO_MATCH_SENTINEL};

    fn recommendation(sku: &str) -> MatchRecommendation {
        MatchRecommendation {
            item_no: "1".to_string(),
            rfp_description: "armoured cable".to_string(),
            top_candidates: Vec::new(),
            selected_sku: sku.to_string(),
            selection_reason: String::new(),
        }
    }

    #[test]
    fn sentinel_and_empty_skus_count_as_unmatched() {
        assert!(recommendation("CAB-001").is_matched());
        assert!(!recommendation(NO_MATCH_SENTINEL).is_matched());
        assert!(!recommendation("").is_matched());
    }
}
