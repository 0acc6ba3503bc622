use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One denormalized sales transaction.
///
/// Invariants are established at load time by `sales-ingest` and hold for
/// the process lifetime: `total_value` is non-negative and `order_date` is
/// a valid calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_date: NaiveDate,
    pub customer_state: String,
    pub customer_city: String,
    pub representative_name: String,
    pub product_name: String,
    pub region: String,
    pub total_value: f64,
}

/// A filterable column of the sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    State,
    City,
    Representative,
    Product,
    Region,
}

impl Field {
    /// All filterable fields in display order.
    pub const ALL: [Field; 5] = [
        Field::State,
        Field::City,
        Field::Representative,
        Field::Product,
        Field::Region,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::State => "state",
            Field::City => "city",
            Field::Representative => "representative",
            Field::Product => "product",
            Field::Region => "region",
        }
    }

    fn value_of(self, record: &SalesRecord) -> &str {
        match self {
            Field::State => &record.customer_state,
            Field::City => &record.customer_city,
            Field::Representative => &record.representative_name,
            Field::Product => &record.product_name,
            Field::Region => &record.region,
        }
    }
}

/// The dataset store: an ordered sales table, immutable after load.
///
/// Constructed once by the ingest layer and shared read-only with the
/// reactive core, so no locking discipline is needed around it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<SalesRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a column in first-seen order.
    ///
    /// Seeds independent selector domains, matching the order the source
    /// table presents them rather than an alphabetical sort.
    pub fn column_values(&self, field: Field) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut values = Vec::new();
        for record in &self.records {
            let value = field.value_of(record);
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, city: &str) -> SalesRecord {
        SalesRecord {
            order_date: NaiveDate::from_ymd_opt(2023, 1, 5).expect("valid date"),
            customer_state: state.to_string(),
            customer_city: city.to_string(),
            representative_name: "Ana".to_string(),
            product_name: "Widget".to_string(),
            region: "South".to_string(),
            total_value: 10.0,
        }
    }

    #[test]
    fn column_values_are_distinct_in_first_seen_order() {
        let dataset = Dataset::new(vec![
            record("SP", "Santos"),
            record("RJ", "Niteroi"),
            record("SP", "Campinas"),
            record("RJ", "Niteroi"),
        ]);
        assert_eq!(dataset.column_values(Field::State), vec!["SP", "RJ"]);
        assert_eq!(
            dataset.column_values(Field::City),
            vec!["Santos", "Niteroi", "Campinas"]
        );
    }

    #[test]
    fn empty_dataset_has_empty_columns() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert!(dataset.column_values(Field::Region).is_empty());
    }
}
