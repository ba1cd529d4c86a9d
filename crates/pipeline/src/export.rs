//! Tabular price-bid export (the "Annexure VI" sheet).

use std::path::Path;

use bidpilot_core::domain::bid::{BidLine, PricedBid};

use crate::error::PipelineError;

/// Fixed column order; the consumer of this sheet fills a form with it.
const HEADER: [&str; 9] = [
    "S.No",
    "Item Description",
    "Quantity",
    "Unit Material Cost",
    "Total Material",
    "Service/Test Cost",
    "Pre-Tax Cost",
    "Tax Amount",
    "Grand Total",
];

pub async fn write_price_bid_csv(path: &Path, bid: &PricedBid) -> Result<(), PipelineError> {
    let mut out = String::new();
    push_row(&mut out, &HEADER.map(String::from));

    for line in &bid.lines {
        match line {
            BidLine::Priced(priced) => push_row(
                &mut out,
                &[
                    priced.item_no.clone(),
                    priced.description.clone(),
                    priced.quantity.to_string(),
                    format!("{:.2}", priced.unit_price),
                    format!("{:.2}", priced.material_total),
                    format!("{:.2}", priced.service_cost),
                    format!("{:.2}", priced.pretax_total),
                    format!("{:.2}", priced.tax_amount),
                    format!("{:.2}", priced.line_total),
                ],
            ),
            BidLine::NoMatch(unmatched) => push_row(
                &mut out,
                &[
                    unmatched.item_no.clone(),
                    format!("{} (NO MATCH)", unmatched.description),
                    "0".to_string(),
                    "0.00".to_string(),
                    "0.00".to_string(),
                    "0.00".to_string(),
                    "0.00".to_string(),
                    "0.00".to_string(),
                    "0.00".to_string(),
                ],
            ),
        }
    }

    // Closing summary row: only the label and the grand total carry values.
    push_row(
        &mut out,
        &[
            String::new(),
            "GRAND TOTAL".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            format!("{:.2}", bid.grand_total),
        ],
    );

    tokio::fs::write(path, out)
        .await
        .map_err(|source| PipelineError::WriteArtifact { path: path.to_path_buf(), source })
}

fn push_row(out: &mut String, fields: &[String; 9]) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape(field));
        first = false;
    }
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use bidpilot_core::domain::bid::{BidLine, NoMatchLine, PricedBid, PricedLine};
    use rust_decimal::Decimal;

    use super::{escape, write_price_bid_csv};

    fn priced_line() -> PricedLine {
        PricedLine {
            item_no: "1".to_string(),
            description: "Cable, armoured".to_string(),
            sku: "X".to_string(),
            quantity: Decimal::from(4),
            unit_price: Decimal::new(5923, 2),
            material_total: Decimal::new(23690, 2),
            service_cost: Decimal::ZERO,
            pretax_total: Decimal::new(23690, 2),
            tax_amount: Decimal::ZERO,
            line_total: Decimal::new(23690, 2),
        }
    }

    #[tokio::test]
    async fn export_has_data_rows_plus_grand_total_row() {
        let bid = PricedBid {
            lines: vec![
                BidLine::Priced(priced_line()),
                BidLine::NoMatch(NoMatchLine {
                    item_no: "2".to_string(),
                    description: "item 2".to_string(),
                    reason: "no acceptable SKU match".to_string(),
                }),
            ],
            grand_total: Decimal::new(23690, 2),
        };

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("price_bid.csv");
        write_price_bid_csv(&path, &bid).await.expect("export writes");

        let content = tokio::fs::read_to_string(&path).await.expect("read export");
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4, "header + 2 data rows + summary");
        assert!(rows[0].starts_with("S.No,Item Description,Quantity"));
        // Description containing a comma must be quoted.
        assert!(rows[1].contains("\"Cable, armoured\""));
        assert!(rows[1].ends_with("59.23,236.90,0.00,236.90,0.00,236.90"));
        assert!(rows[2].contains("item 2 (NO MATCH)"));
        assert!(rows[3].ends_with("GRAND TOTAL,,,,,,,236.90"));
    }

    #[test]
    fn escape_quotes_embedded_quotes() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a\"b"), "\"a\"\"b\"");
        assert_eq!(escape("a,b"), "\"a,b\"");
    }
}
