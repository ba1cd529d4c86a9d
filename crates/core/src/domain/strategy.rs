use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStrategy {
    pub item_no: String,
    pub margin_percent: Decimal,
    #[serde(default)]
    pub rationale: String,
}

/// Commercial strategy produced by the inference capability during the
/// pricing phase; the computation engine treats it as read-only input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingStrategy {
    pub risk_assessment: String,
    pub global_margin_percent: Decimal,
    pub transport_overhead_percent: Decimal,
    pub split_award_strategy: String,
    #[serde(default)]
    pub item_strategies: Vec<ItemStrategy>,
    pub strategic_rationale: String,
}

impl PricingStrategy {
    /// Conservative defaults used when strategy inference fails outright.
    pub fn fallback(reason: &str) -> Self {
        Self {
            risk_assessment: format!("Strategy inference failed ({reason}); using defaults."),
            global_margin_percent: Decimal::from(15),
            transport_overhead_percent: Decimal::from(2),
            split_award_strategy: "Standard".to_string(),
            item_strategies: Vec::new(),
            strategic_rationale: "Fallback defaults applied after inference failure.".to_string(),
        }
    }

    /// Margin for one item: per-item override when present, else global.
    pub fn margin_for(&self, item_no: &str) -> Decimal {
        self.item_strategies
            .iter()
            .find(|item| item.item_no == item_no)
            .map(|item| item.margin_percent)
            .unwrap_or(self.global_margin_percent)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ItemStrategy, PricingStrategy};

    #[test]
    fn per_item_override_wins_over_global_margin() {
        let mut strategy = PricingStrategy::fallback("test");
        strategy.global_margin_percent = Decimal::from(20);
        strategy.item_strategies.push(ItemStrategy {
            item_no: "2".to_string(),
            margin_percent: Decimal::from(8),
            rationale: "competitive line".to_string(),
        });

        assert_eq!(strategy.margin_for("1"), Decimal::from(20));
        assert_eq!(strategy.margin_for("2"), Decimal::from(8));
    }
}
