use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the bill of materials extracted from the procurement
/// document. Immutable once written; matching and pricing join against
/// `item_no`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BomItem {
    pub item_no: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_make: Option<String>,
    #[serde(default)]
    pub requires_local_content_declaration: bool,
}

impl BomItem {
    pub fn quantity_for<'a>(items: &'a [BomItem], item_no: &str) -> Option<&'a BomItem> {
        items.iter().find(|item| item.item_no == item_no)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::BomItem;

    fn item(no: &str, qty: i64) -> BomItem {
        BomItem {
            item_no: no.to_string(),
            description: format!("item {no}"),
            quantity: Decimal::from(qty),
            unit: "nos".to_string(),
            category: None,
            delivery_location: None,
            requested_make: None,
            requires_local_content_declaration: false,
        }
    }

    #[test]
    fn quantity_join_finds_matching_item_number() {
        let bom = vec![item("1", 4), item("2", 9)];
        let found = BomItem::quantity_for(&bom, "2").expect("item 2 present");
        assert_eq!(found.quantity, Decimal::from(9));
        assert!(BomItem::quantity_for(&bom, "3").is_none());
    }

    #[test]
    fn optional_fields_deserialize_from_sparse_json() {
        let parsed: BomItem = serde_json::from_str(
            r#"{"item_no":"1","description":"armoured cable","quantity":12.5,"unit":"km"}"#,
        )
        .expect("sparse bom item parses");
        assert_eq!(parsed.quantity, Decimal::new(125, 1));
        assert!(parsed.category.is_none());
        assert!(!parsed.requires_local_content_declaration);
    }
}
