//! Read-only pricing catalogs loaded from header-row CSV files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("catalog file `{path}` is empty")]
    EmptyFile { path: PathBuf },
    #[error("catalog file `{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("catalog file `{path}` line {line}: invalid price `{value}`")]
    InvalidPrice { path: PathBuf, line: usize, value: String },
    #[error("catalog file `{path}` line {line}: expected at least {expected} fields")]
    ShortRow { path: PathBuf, line: usize, expected: usize },
}

/// SKU → unit base price.
#[derive(Clone, Debug, Default)]
pub struct MaterialCatalog {
    prices: HashMap<String, Decimal>,
}

impl MaterialCatalog {
    pub fn new(prices: HashMap<String, Decimal>) -> Self {
        Self { prices }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let rows = read_rows(path)?;
        let sku_col = find_column(&rows.header, path, &["sku"])?;
        let price_col = find_price_column(&rows.header, path)?;

        let mut prices = HashMap::new();
        for (line, fields) in rows.records {
            let width = sku_col.max(price_col) + 1;
            if fields.len() < width {
                return Err(CatalogError::ShortRow { path: path.to_path_buf(), line, expected: width });
            }
            let price = parse_price(&fields[price_col], path, line)?;
            prices.insert(fields[sku_col].clone(), price);
        }
        Ok(Self { prices })
    }

    pub fn price_of(&self, sku: &str) -> Option<Decimal> {
        self.prices.get(sku).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Ordered (test name, unit price) list. Order matters: service matching
/// selects the first entry whose name overlaps a required test.
#[derive(Clone, Debug, Default)]
pub struct ServiceCatalog {
    entries: Vec<(String, Decimal)>,
}

impl ServiceCatalog {
    pub fn new(entries: Vec<(String, Decimal)>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let rows = read_rows(path)?;
        let name_col = find_column(&rows.header, path, &["test_name", "name"])?;
        let price_col = find_price_column(&rows.header, path)?;

        let mut entries = Vec::new();
        for (line, fields) in rows.records {
            let width = name_col.max(price_col) + 1;
            if fields.len() < width {
                return Err(CatalogError::ShortRow { path: path.to_path_buf(), line, expected: width });
            }
            let price = parse_price(&fields[price_col], path, line)?;
            entries.push((fields[name_col].clone(), price));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, Decimal)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Rows {
    header: Vec<String>,
    /// (1-based source line, fields)
    records: Vec<(usize, Vec<String>)>,
}

fn read_rows(path: &Path) -> Result<Rows, CatalogError> {
    let content = fs::read_to_string(path)
        .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;

    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, split_csv_line(line)));

    let header = match lines.next() {
        Some((_, fields)) => fields,
        None => return Err(CatalogError::EmptyFile { path: path.to_path_buf() }),
    };

    Ok(Rows { header, records: lines.collect() })
}

fn find_column(header: &[String], path: &Path, names: &[&str]) -> Result<usize, CatalogError> {
    header
        .iter()
        .position(|column| names.iter().any(|name| column.trim().eq_ignore_ascii_case(name)))
        .ok_or_else(|| CatalogError::MissingColumn {
            path: path.to_path_buf(),
            column: names[0].to_string(),
        })
}

/// Accepts `Unit_Price` exactly or any column starting with `base_price`
/// (source data uses headers like `Base_Price_Per_Km`).
fn find_price_column(header: &[String], path: &Path) -> Result<usize, CatalogError> {
    header
        .iter()
        .position(|column| {
            let normalized = column.trim().to_ascii_lowercase();
            normalized == "unit_price"
                || normalized == "unit_price_inr"
                || normalized.starts_with("base_price")
        })
        .ok_or_else(|| CatalogError::MissingColumn {
            path: path.to_path_buf(),
            column: "unit_price".to_string(),
        })
}

fn parse_price(raw: &str, path: &Path, line: usize) -> Result<Decimal, CatalogError> {
    raw.trim().parse::<Decimal>().map_err(|_| CatalogError::InvalidPrice {
        path: path.to_path_buf(),
        line,
        value: raw.to_string(),
    })
}

/// Minimal quote-aware CSV field splitter. Double quotes inside quoted
/// fields escape as `""`.
pub(crate) fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal::Decimal;

    use super::{split_csv_line, CatalogError, MaterialCatalog, ServiceCatalog};

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write catalog");
        file
    }

    #[test]
    fn loads_material_catalog_with_domain_specific_price_header() {
        let file = write_temp("SKU,Description,Base_Price_Per_Km\nCAB-001,Armoured cable,50\nCAB-002,\"Cable, shielded\",112.75\n");
        let catalog = MaterialCatalog::load(file.path()).expect("catalog loads");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price_of("CAB-001"), Some(Decimal::from(50)));
        assert_eq!(catalog.price_of("CAB-002"), Some(Decimal::new(11275, 2)));
        assert_eq!(catalog.price_of("CAB-999"), None);
    }

    #[test]
    fn service_catalog_preserves_file_order() {
        let file = write_temp(
            "Test_Name,Unit_Price\nWater penetration test,120\nTensile strength test,80\n",
        );
        let catalog = ServiceCatalog::load(file.path()).expect("catalog loads");

        let names: Vec<_> = catalog.entries().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Water penetration test", "Tensile strength test"]);
    }

    #[test]
    fn missing_price_column_is_a_typed_error() {
        let file = write_temp("SKU,Description\nCAB-001,cable\n");
        let error = MaterialCatalog::load(file.path()).expect_err("must fail");
        assert!(matches!(error, CatalogError::MissingColumn { .. }));
    }

    #[test]
    fn malformed_price_reports_line_number() {
        let file = write_temp("SKU,Unit_Price\nCAB-001,fifty\n");
        let error = MaterialCatalog::load(file.path()).expect_err("must fail");
        match error {
            CatalogError::InvalidPrice { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "fifty");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn split_handles_quoted_commas_and_escaped_quotes() {
        assert_eq!(split_csv_line("a,\"b,c\",\"d\"\"e\""), vec!["a", "b,c", "d\"e"]);
    }
}
