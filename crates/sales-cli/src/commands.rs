//! Command implementations: load the dataset, drive the dashboard, print.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing::{info, warn};

use sales_core::dashboard::selectors;
use sales_core::{Dashboard, DashboardError, SelectionEvent, SelectionValue};
use sales_ingest::read_sales_csv;
use sales_model::{Dataset, Field};

use crate::cli::{ColumnsArgs, EventsArgs, ShowArgs};
use crate::render::render_output;

fn load_dataset(path: &std::path::Path) -> Result<Dataset> {
    let dataset =
        read_sales_csv(path).with_context(|| format!("load sales data: {}", path.display()))?;
    info!(records = dataset.len(), "sales table loaded");
    Ok(dataset)
}

/// Selection flags, in cascade order so a state flag reshapes the city
/// domain before the city flag is validated against it.
fn selection_events(args: &ShowArgs) -> Vec<SelectionEvent> {
    let mut events = Vec::new();
    if let Some(state) = &args.state {
        events.push(SelectionEvent::single(selectors::STATE, state));
    }
    if !args.cities.is_empty() {
        events.push(SelectionEvent {
            selector: selectors::CITY.to_string(),
            value: SelectionValue::multi(args.cities.iter().map(String::as_str)),
        });
    }
    if let Some(product) = &args.product {
        events.push(SelectionEvent::single(selectors::PRODUCT, product));
    }
    if let Some(state) = &args.detail_state {
        events.push(SelectionEvent::single(selectors::DETAIL_STATE, state));
    }
    if let Some(city) = &args.detail_city {
        events.push(SelectionEvent::single(selectors::DETAIL_CITY, city));
    }
    events
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let dataset = load_dataset(&args.data)?;
    let mut dashboard = Dashboard::standard(dataset)?;

    for event in selection_events(args) {
        dashboard
            .select(&event)
            .with_context(|| format!("apply selection for `{}`", event.selector))?;
    }

    for output in dashboard.render_all() {
        println!("{}", render_output(&output));
    }
    Ok(())
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let dataset = load_dataset(&args.data)?;
    for field in Field::ALL {
        println!("{}: {}", field.label(), dataset.column_values(field).join(", "));
    }
    Ok(())
}

/// Reads one selection event per line and prints the affected views as a
/// JSON array per event. An invalid selection is a logged no-op, leaving
/// the previous state in place.
pub fn run_events(args: &EventsArgs) -> Result<()> {
    let dataset = load_dataset(&args.data)?;
    let mut dashboard = Dashboard::standard(dataset)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("read selection event")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: SelectionEvent =
            serde_json::from_str(&line).with_context(|| format!("parse event: {line}"))?;
        match dashboard.select(&event) {
            Ok(outputs) => {
                let payload = serde_json::to_string(&outputs).context("serialize outputs")?;
                println!("{payload}");
            }
            Err(error @ DashboardError::InvalidSelection { .. }) => {
                warn!(%error, "selection rejected");
                println!("[]");
            }
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}
