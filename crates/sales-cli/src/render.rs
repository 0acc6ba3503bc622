//! Terminal rendering of view outputs.
//!
//! A stand-in for the charting collaborator: every aggregate shape is
//! printed as a `comfy-table` table, with share views adding a
//! percentage column.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use sales_model::{AggregateResult, ViewOutput};

fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

fn base_table(output: &ViewOutput) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![output.x_label.clone(), output.y_label.clone()]);
    table
}

/// Renders one view as a titled table.
pub fn render_output(output: &ViewOutput) -> String {
    let mut table = base_table(output);
    match &output.result {
        AggregateResult::TimeSeries(rows) => {
            for row in rows {
                table.add_row(vec![row.month.to_string(), format_value(row.total)]);
            }
        }
        AggregateResult::CategoryBars(rows) => {
            for row in rows {
                table.add_row(vec![row.category.clone(), format_value(row.value)]);
            }
        }
        AggregateResult::CategoryShares(rows) => {
            table.set_header(vec![
                output.x_label.clone(),
                output.y_label.clone(),
                "Share".to_string(),
            ]);
            let shares = output.result.proportions().unwrap_or_default();
            for (row, share) in rows.iter().zip(&shares) {
                table.add_row(vec![
                    row.category.clone(),
                    format_value(row.value),
                    format!("{:.1}%", share.value * 100.0),
                ]);
            }
        }
        AggregateResult::RecordTable(rows) => {
            for row in rows {
                table.add_row(vec![row.label.clone(), format_value(row.value)]);
            }
        }
        AggregateResult::PivotSeries(rows) => {
            for row in rows {
                table.add_row(vec![row.month.clone(), format_value(row.total)]);
            }
        }
    }

    let mut text = String::new();
    text.push_str(&output.title);
    if output.result.is_empty() {
        text.push_str("\n(no matching records)\n");
    } else {
        text.push('\n');
        text.push_str(&table.to_string());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_model::{CategoryValue, MonthSum};

    fn output(result: AggregateResult) -> ViewOutput {
        ViewOutput {
            view: "test_view".to_string(),
            title: "Test View".to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            result,
        }
    }

    #[test]
    fn renders_time_series_rows() {
        let text = render_output(&output(AggregateResult::TimeSeries(vec![MonthSum {
            month: 1,
            total: 150.0,
        }])));
        assert!(text.starts_with("Test View\n"));
        assert!(text.contains("150.00"));
    }

    #[test]
    fn renders_share_percentages() {
        let text = render_output(&output(AggregateResult::CategoryShares(vec![
            CategoryValue {
                category: "South".to_string(),
                value: 75.0,
            },
            CategoryValue {
                category: "North".to_string(),
                value: 25.0,
            },
        ])));
        assert!(text.contains("75.0%"));
        assert!(text.contains("25.0%"));
    }

    #[test]
    fn empty_result_renders_a_placeholder() {
        let text = render_output(&output(AggregateResult::RecordTable(Vec::new())));
        assert!(text.contains("no matching records"));
    }
}
