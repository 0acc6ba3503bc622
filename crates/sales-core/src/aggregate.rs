//! Aggregation engine: pure functions from (dataset, selection) to one
//! aggregate payload.
//!
//! No function here shares mutable state with another; each reads the
//! immutable dataset and the selection values it was handed and builds a
//! fresh result. Two semantics are intentional: representative and
//! product views emit one row per record rather than grouped sums, and
//! monthly totals merge records across years by calendar month number.

use std::collections::BTreeMap;

use chrono::{Datelike, Month};

use sales_model::{
    AggregateResult, CategoryValue, Dataset, MonthLabelSum, MonthSum, SalesRecord, TableRow,
};

/// Records passing the shared city multi-select; an empty selection means
/// no constraint.
fn filtered_by_cities<'a>(
    dataset: &'a Dataset,
    cities: &'a [String],
) -> impl Iterator<Item = &'a SalesRecord> {
    dataset.records().iter().filter(move |record| {
        cities.is_empty() || cities.iter().any(|city| city == &record.customer_city)
    })
}

fn region_key(record: &SalesRecord) -> &str {
    &record.region
}

fn state_key(record: &SalesRecord) -> &str {
    &record.customer_state
}

/// Groups values by key in first-seen order.
fn group_sums<'a>(
    records: impl Iterator<Item = &'a SalesRecord>,
    key: fn(&SalesRecord) -> &str,
) -> Vec<CategoryValue> {
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut rows: Vec<CategoryValue> = Vec::new();
    for record in records {
        let label = key(record);
        match positions.get(label) {
            Some(&position) => rows[position].value += record.total_value,
            None => {
                positions.insert(label.to_string(), rows.len());
                rows.push(CategoryValue {
                    category: label.to_string(),
                    value: record.total_value,
                });
            }
        }
    }
    rows
}

fn month_name(month: u32) -> String {
    Month::try_from(month as u8).map_or_else(|_| month.to_string(), |m| m.name().to_string())
}

/// Filtered records grouped by calendar month number (1-12), summed,
/// ascending by month. Records from different years sharing a month
/// number land in the same row.
pub fn monthly_totals(dataset: &Dataset, cities: &[String]) -> AggregateResult {
    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for record in filtered_by_cities(dataset, cities) {
        *sums.entry(record.order_date.month()).or_insert(0.0) += record.total_value;
    }
    AggregateResult::TimeSeries(
        sums.into_iter()
            .map(|(month, total)| MonthSum { month, total })
            .collect(),
    )
}

/// One row per filtered record, representative against transaction value.
/// Deliberately unaggregated: the chart plots individual transactions,
/// not per-representative sums.
pub fn sales_by_representative(dataset: &Dataset, cities: &[String]) -> AggregateResult {
    AggregateResult::CategoryBars(
        filtered_by_cities(dataset, cities)
            .map(|record| CategoryValue {
                category: record.representative_name.clone(),
                value: record.total_value,
            })
            .collect(),
    )
}

/// Raw filtered rows of (product, value) in original dataset order.
pub fn sales_by_product(dataset: &Dataset, cities: &[String]) -> AggregateResult {
    AggregateResult::RecordTable(
        filtered_by_cities(dataset, cities)
            .map(|record| TableRow {
                label: record.product_name.clone(),
                value: record.total_value,
                order_date: None,
            })
            .collect(),
    )
}

/// Filtered records grouped by region, summed, as a share breakdown.
pub fn sales_by_region(dataset: &Dataset, cities: &[String]) -> AggregateResult {
    AggregateResult::CategoryShares(group_sums(filtered_by_cities(dataset, cities), region_key))
}

/// Filtered records grouped by customer state, summed.
pub fn sales_by_state(dataset: &Dataset, cities: &[String]) -> AggregateResult {
    AggregateResult::CategoryBars(group_sums(filtered_by_cities(dataset, cities), state_key))
}

/// One product's sales grouped by calendar month name, in calendar order.
/// Months with no records for the product get no row at all.
pub fn sales_by_product_month(dataset: &Dataset, product: Option<&str>) -> AggregateResult {
    let Some(product) = product else {
        return AggregateResult::PivotSeries(Vec::new());
    };
    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for record in dataset.records() {
        if record.product_name == product {
            *sums.entry(record.order_date.month()).or_insert(0.0) += record.total_value;
        }
    }
    AggregateResult::PivotSeries(
        sums.into_iter()
            .map(|(month, total)| MonthLabelSum {
                month: month_name(month),
                total,
            })
            .collect(),
    )
}

/// Transactions matching one exact (state, city) pair, unaggregated, in
/// original order. Zero matches yield an empty table, not an error.
pub fn sales_by_state_city(
    dataset: &Dataset,
    state: Option<&str>,
    city: Option<&str>,
) -> AggregateResult {
    let (Some(state), Some(city)) = (state, city) else {
        return AggregateResult::RecordTable(Vec::new());
    };
    AggregateResult::RecordTable(
        dataset
            .records()
            .iter()
            .filter(|record| record.customer_state == state && record.customer_city == city)
            .map(|record| TableRow {
                label: record.order_date.to_string(),
                value: record.total_value,
                order_date: Some(record.order_date),
            })
            .collect(),
    )
}
