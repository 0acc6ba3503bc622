//! Computed aggregate payloads handed to the rendering collaborator.
//!
//! Each variant corresponds to one chart shape. Results are ephemeral:
//! recomputed on demand from the dataset and the current filter state,
//! never cached across unrelated filter states.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (calendar month number, summed value) row of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSum {
    /// Calendar month number, 1-12. Records from different years sharing
    /// a month number are summed into the same row.
    pub month: u32,
    pub total: f64,
}

/// One (calendar month name, summed value) row of a pivot series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthLabelSum {
    /// English month name ("January" .. "December").
    pub month: String,
    pub total: f64,
}

/// One (category, value) row. Categories may repeat when the rows are
/// per-record rather than grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: f64,
}

/// One row of an unaggregated record table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub value: f64,
    /// Order date of the source record, when the view is date-keyed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
}

/// Shape tag for an [`AggregateResult`], exposed so the rendering
/// collaborator can pick a chart type without inspecting row data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    TimeSeries,
    CategoryBars,
    CategoryShares,
    RecordTable,
    PivotSeries,
}

/// A computed aggregate, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows")]
pub enum AggregateResult {
    /// Rows of (month number, sum), ascending by month.
    TimeSeries(Vec<MonthSum>),
    /// Rows of (category, value); may be grouped or per-record.
    CategoryBars(Vec<CategoryValue>),
    /// Rows of (category, sum), rendered as proportions of the total.
    CategoryShares(Vec<CategoryValue>),
    /// Unaggregated rows in original dataset order.
    RecordTable(Vec<TableRow>),
    /// Rows of (month name, sum) in calendar order for one fixed category.
    PivotSeries(Vec<MonthLabelSum>),
}

impl AggregateResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            AggregateResult::TimeSeries(_) => ResultKind::TimeSeries,
            AggregateResult::CategoryBars(_) => ResultKind::CategoryBars,
            AggregateResult::CategoryShares(_) => ResultKind::CategoryShares,
            AggregateResult::RecordTable(_) => ResultKind::RecordTable,
            AggregateResult::PivotSeries(_) => ResultKind::PivotSeries,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            AggregateResult::TimeSeries(rows) => rows.len(),
            AggregateResult::CategoryBars(rows) => rows.len(),
            AggregateResult::CategoryShares(rows) => rows.len(),
            AggregateResult::RecordTable(rows) => rows.len(),
            AggregateResult::PivotSeries(rows) => rows.len(),
        }
    }

    /// A filter combination matching zero records yields an empty but
    /// well-formed result, never an error.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Sum of all row values. Useful for consistency checks across views.
    pub fn total(&self) -> f64 {
        match self {
            AggregateResult::TimeSeries(rows) => rows.iter().map(|r| r.total).sum(),
            AggregateResult::CategoryBars(rows) => rows.iter().map(|r| r.value).sum(),
            AggregateResult::CategoryShares(rows) => rows.iter().map(|r| r.value).sum(),
            AggregateResult::RecordTable(rows) => rows.iter().map(|r| r.value).sum(),
            AggregateResult::PivotSeries(rows) => rows.iter().map(|r| r.total).sum(),
        }
    }

    /// Share rows normalized to fractions of the total.
    ///
    /// Only meaningful for [`AggregateResult::CategoryShares`]; returns
    /// `None` for other shapes. A zero total yields zero shares.
    pub fn proportions(&self) -> Option<Vec<CategoryValue>> {
        let AggregateResult::CategoryShares(rows) = self else {
            return None;
        };
        let total: f64 = rows.iter().map(|r| r.value).sum();
        Some(
            rows.iter()
                .map(|row| CategoryValue {
                    category: row.category.clone(),
                    value: if total > 0.0 { row.value / total } else { 0.0 },
                })
                .collect(),
        )
    }
}
