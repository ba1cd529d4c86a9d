use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fully priced bid line. All monetary fields are already rounded to
/// two decimal places; intermediate math stays at full precision inside
/// the computation engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub item_no: String,
    pub description: String,
    pub sku: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub material_total: Decimal,
    pub service_cost: Decimal,
    pub pretax_total: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

/// Error marker for an item that could not be priced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoMatchLine {
    pub item_no: String,
    pub description: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BidLine {
    Priced(PricedLine),
    NoMatch(NoMatchLine),
}

impl BidLine {
    pub fn item_no(&self) -> &str {
        match self {
            Self::Priced(line) => &line.item_no,
            Self::NoMatch(line) => &line.item_no,
        }
    }
}

/// Terminal artifact of the pipeline: ordered bid lines plus the grand
/// total over all priced lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedBid {
    pub lines: Vec<BidLine>,
    pub grand_total: Decimal,
}
