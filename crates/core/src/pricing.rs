//! Deterministic pricing computation engine.
//!
//! Pure function from matched items, a pricing strategy, and catalog data
//! to priced bid lines and a grand total. No inference calls, no I/O.
//! All arithmetic runs at full `Decimal` precision; rounding to two
//! decimal places happens once, when a line is emitted.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::catalog::{MaterialCatalog, ServiceCatalog};
use crate::domain::bid::{BidLine, NoMatchLine, PricedBid, PricedLine};
use crate::domain::bom::BomItem;
use crate::domain::matching::MatchRecommendation;
use crate::domain::strategy::PricingStrategy;

/// Tax applied when the commercial terms do not declare taxes inclusive.
const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2); // 0.18

pub struct PricingInputs<'a> {
    pub matches: &'a [MatchRecommendation],
    pub strategy: &'a PricingStrategy,
    pub materials: &'a MaterialCatalog,
    pub services: &'a ServiceCatalog,
    pub required_tests: &'a [String],
    pub bom: &'a [BomItem],
    /// Free-text tax clause from the commercial terms.
    pub tax_terms: &'a str,
}

pub fn compute_bid(inputs: PricingInputs<'_>) -> PricedBid {
    let tax_rate = tax_rate_for(inputs.tax_terms);
    let total_service_cost = total_service_cost(inputs.required_tests, inputs.services);

    let matched_count = inputs.matches.iter().filter(|m| m.is_matched()).count();
    let per_item_service_cost = if matched_count > 0 {
        total_service_cost / Decimal::from(matched_count)
    } else {
        Decimal::ZERO
    };

    let hundred = Decimal::from(100);
    let transport_factor = Decimal::ONE + inputs.strategy.transport_overhead_percent / hundred;

    let mut lines = Vec::with_capacity(inputs.matches.len());
    let mut grand_total = Decimal::ZERO;

    for recommendation in inputs.matches {
        let bom_item = BomItem::quantity_for(inputs.bom, &recommendation.item_no);
        let description = if recommendation.rfp_description.is_empty() {
            bom_item.map(|item| item.description.clone()).unwrap_or_default()
        } else {
            recommendation.rfp_description.clone()
        };

        let base_price = if recommendation.is_matched() {
            inputs.materials.price_of(&recommendation.selected_sku)
        } else {
            None
        };

        let Some(base_price) = base_price else {
            let reason = if recommendation.is_matched() {
                format!("selected SKU `{}` is not in the material catalog", recommendation.selected_sku)
            } else {
                "no acceptable SKU match".to_string()
            };
            lines.push(BidLine::NoMatch(NoMatchLine {
                item_no: recommendation.item_no.clone(),
                description,
                reason,
            }));
            continue;
        };

        let quantity = bom_item.map(|item| item.quantity).unwrap_or(Decimal::ZERO);
        let margin = inputs.strategy.margin_for(&recommendation.item_no);

        let cost_with_transport = base_price * transport_factor;
        let unit_price = cost_with_transport * (Decimal::ONE + margin / hundred);
        let material_total = unit_price * quantity;
        let pretax_total = material_total + per_item_service_cost;
        let tax_amount = pretax_total * tax_rate;
        let line_total = pretax_total + tax_amount;

        grand_total += line_total;

        lines.push(BidLine::Priced(PricedLine {
            item_no: recommendation.item_no.clone(),
            description,
            sku: recommendation.selected_sku.clone(),
            quantity,
            unit_price: round2(unit_price),
            material_total: round2(material_total),
            service_cost: round2(per_item_service_cost),
            pretax_total: round2(pretax_total),
            tax_amount: round2(tax_amount),
            line_total: round2(line_total),
        }));
    }

    PricedBid { lines, grand_total: round2(grand_total) }
}

/// Tax-inclusive commercial terms zero the tax leg.
pub fn tax_rate_for(tax_terms: &str) -> Decimal {
    if tax_terms.to_lowercase().contains("inclusive") {
        Decimal::ZERO
    } else {
        DEFAULT_TAX_RATE
    }
}

/// Sum of the first service-catalog entry matched per required test.
/// A catalog entry matches a test when the two names share at least two
/// whitespace-delimited tokens, compared case-insensitively.
fn total_service_cost(required_tests: &[String], services: &ServiceCatalog) -> Decimal {
    let mut total = Decimal::ZERO;
    for test in required_tests {
        let test_tokens: Vec<String> =
            test.split_whitespace().map(str::to_lowercase).collect();
        for (name, price) in services.entries() {
            let overlap = name
                .split_whitespace()
                .map(str::to_lowercase)
                .filter(|token| test_tokens.contains(token))
                .count();
            if overlap >= 2 {
                total += *price;
                break;
            }
        }
    }
    total
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
