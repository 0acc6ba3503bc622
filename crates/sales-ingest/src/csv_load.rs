//! CSV loading for the denormalized sales table.
//!
//! The source is the sales export with Portuguese column headers. Two
//! normalizations are applied while reading: currency strings
//! (`"R$ 1234.56"`) become non-negative `f64` values, and order dates in
//! `MM-DD-YY` become calendar dates. Any row that fails either
//! normalization fails the whole load.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::debug;

use sales_model::{Dataset, SalesRecord};

use crate::error::{IngestError, Result};

/// Column headers of the source export.
pub const COL_ORDER_DATE: &str = "Data_Pedido";
pub const COL_STATE: &str = "Estado_Cliente";
pub const COL_CITY: &str = "Cidade_Cliente";
pub const COL_REPRESENTATIVE: &str = "Nome_Representante";
pub const COL_PRODUCT: &str = "Nome_Produto";
pub const COL_REGION: &str = "Regional";
pub const COL_TOTAL_VALUE: &str = "Valor_Total_Venda";

/// Date format of the source export (`01-25-23` = January 25, 2023).
const ORDER_DATE_FORMAT: &str = "%m-%d-%y";

struct ColumnIndex {
    order_date: usize,
    state: usize,
    city: usize,
    representative: usize,
    product: usize,
    region: usize,
    total_value: usize,
}

fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

fn find_column(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| normalize_header(header) == name)
        .ok_or(IngestError::MissingColumn(name))
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        Ok(Self {
            order_date: find_column(headers, COL_ORDER_DATE)?,
            state: find_column(headers, COL_STATE)?,
            city: find_column(headers, COL_CITY)?,
            representative: find_column(headers, COL_REPRESENTATIVE)?,
            product: find_column(headers, COL_PRODUCT)?,
            region: find_column(headers, COL_REGION)?,
            total_value: find_column(headers, COL_TOTAL_VALUE)?,
        })
    }
}

/// Normalizes a currency cell to a non-negative amount.
///
/// Strips an optional `R$` prefix and stray double quotes before parsing,
/// matching what the source export actually contains.
pub fn parse_currency(raw: &str) -> std::result::Result<f64, String> {
    let cleaned: String = raw.chars().filter(|&ch| ch != '"').collect();
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_prefix("R$").unwrap_or(cleaned).trim();
    if cleaned.is_empty() {
        return Err("empty amount".to_string());
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| "not a decimal amount".to_string())?;
    if !value.is_finite() {
        return Err("not a finite amount".to_string());
    }
    if value < 0.0 {
        return Err("negative amount".to_string());
    }
    Ok(value)
}

/// Parses an order date in the export's `MM-DD-YY` format.
pub fn parse_order_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), ORDER_DATE_FORMAT)
        .map_err(|err| format!("expected MM-DD-YY: {err}"))
}

fn cell<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

/// Reads the sales table from any reader.
///
/// Fails with [`IngestError::MissingColumn`] if a required header is
/// absent and with [`IngestError::DataFormat`] on the first malformed row.
pub fn read_sales_records<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in csv_reader.records().enumerate() {
        let row = row?;
        let row_number = idx + 1;

        let raw_date = cell(&row, columns.order_date);
        let order_date =
            parse_order_date(raw_date).map_err(|reason| IngestError::DataFormat {
                row: row_number,
                column: COL_ORDER_DATE,
                value: raw_date.to_string(),
                reason,
            })?;

        let raw_value = cell(&row, columns.total_value);
        let total_value =
            parse_currency(raw_value).map_err(|reason| IngestError::DataFormat {
                row: row_number,
                column: COL_TOTAL_VALUE,
                value: raw_value.to_string(),
                reason,
            })?;

        records.push(SalesRecord {
            order_date,
            customer_state: cell(&row, columns.state).to_string(),
            customer_city: cell(&row, columns.city).to_string(),
            representative_name: cell(&row, columns.representative).to_string(),
            product_name: cell(&row, columns.product).to_string(),
            region: cell(&row, columns.region).to_string(),
            total_value,
        });
    }

    let dataset = Dataset::new(records);
    debug!(records = dataset.len(), "loaded sales table");
    Ok(dataset)
}

/// Reads the sales table from a CSV file on disk.
pub fn read_sales_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    read_sales_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_strips_prefix_and_quotes() {
        assert_eq!(parse_currency("R$ 1234.56"), Ok(1234.56));
        assert_eq!(parse_currency("\"R$100.00\""), Ok(100.0));
        assert_eq!(parse_currency(" 42 "), Ok(42.0));
        assert_eq!(parse_currency("0"), Ok(0.0));
    }

    #[test]
    fn currency_rejects_garbage_and_negatives() {
        assert!(parse_currency("").is_err());
        assert!(parse_currency("R$").is_err());
        assert!(parse_currency("abc").is_err());
        assert!(parse_currency("-10.0").is_err());
        assert!(parse_currency("NaN").is_err());
    }

    #[test]
    fn order_date_uses_month_day_year() {
        let date = parse_order_date("01-25-23").expect("valid date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 25).expect("ymd"));
        assert!(parse_order_date("2023-01-25").is_err());
        assert!(parse_order_date("13-01-23").is_err());
    }
}
