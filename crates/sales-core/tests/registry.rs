//! Tests for view registration and fine-grained invalidation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sales_core::{
    DashboardError, FilterState, SelectionValue, ViewDefinition, ViewRegistry, standard_graph,
};
use sales_core::dashboard::selectors;
use sales_model::{AggregateResult, Dataset, SalesRecord, TableRow};

fn record(state: &str, city: &str, value: f64) -> SalesRecord {
    SalesRecord {
        order_date: NaiveDate::from_ymd_opt(2023, 6, 1).expect("ymd"),
        customer_state: state.to_string(),
        customer_city: city.to_string(),
        representative_name: "Ana".to_string(),
        product_name: "Widget".to_string(),
        region: "South".to_string(),
        total_value: value,
    }
}

fn sample_dataset() -> Dataset {
    Dataset::new(vec![
        record("SP", "Santos", 10.0),
        record("SP", "Campinas", 20.0),
        record("RJ", "Niteroi", 30.0),
    ])
}

fn count_all(dataset: &Dataset, _state: &FilterState) -> AggregateResult {
    AggregateResult::RecordTable(
        dataset
            .records()
            .iter()
            .map(|record| TableRow {
                label: record.customer_city.clone(),
                value: record.total_value,
                order_date: None,
            })
            .collect(),
    )
}

fn city_rows(dataset: &Dataset, state: &FilterState) -> AggregateResult {
    let cities = state.multi("city");
    AggregateResult::RecordTable(
        dataset
            .records()
            .iter()
            .filter(|record| cities.is_empty() || cities.contains(&record.customer_city))
            .map(|record| TableRow {
                label: record.customer_city.clone(),
                value: record.total_value,
                order_date: None,
            })
            .collect(),
    )
}

fn test_registry() -> ViewRegistry {
    let mut registry = ViewRegistry::new();
    registry
        .register(ViewDefinition::new(
            "all_rows",
            "All Rows",
            "City",
            "Value",
            &[],
            count_all,
        ))
        .expect("register all_rows");
    registry
        .register(ViewDefinition::new(
            "city_rows",
            "City Rows",
            "City",
            "Value",
            &["city"],
            city_rows,
        ))
        .expect("register city_rows");
    registry
        .register(ViewDefinition::new(
            "pair_rows",
            "Pair Rows",
            "City",
            "Value",
            &["detail_state", "detail_city"],
            count_all,
        ))
        .expect("register pair_rows");
    registry
}

fn changed(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

#[test]
fn duplicate_view_ids_are_rejected() {
    let mut registry = test_registry();
    let err = registry
        .register(ViewDefinition::new(
            "all_rows",
            "All Rows Again",
            "City",
            "Value",
            &[],
            count_all,
        ))
        .expect_err("duplicate must fail");
    assert!(matches!(err, DashboardError::DuplicateView(id) if id == "all_rows"));
}

#[test]
fn affected_by_intersects_view_inputs() {
    let registry = test_registry();

    assert_eq!(registry.affected_by(&changed(&["city"])), changed(&["city_rows"]));
    assert_eq!(
        registry.affected_by(&changed(&["detail_city"])),
        changed(&["pair_rows"])
    );
    assert_eq!(
        registry.affected_by(&changed(&["city", "detail_state"])),
        changed(&["city_rows", "pair_rows"])
    );
    assert!(registry.affected_by(&changed(&["product"])).is_empty());
    assert!(registry.affected_by(&BTreeSet::new()).is_empty());
}

#[test]
fn recompute_touches_only_the_requested_views() {
    let dataset = sample_dataset();
    let graph = standard_graph().expect("standard graph");
    let state = graph.initial_state(&dataset);
    let registry = test_registry();

    let outputs = registry.recompute(&changed(&["city_rows"]), &dataset, &state);
    assert_eq!(outputs.len(), 1);
    assert!(outputs.contains_key("city_rows"));
}

#[test]
fn recompute_skips_unknown_view_ids() {
    let dataset = sample_dataset();
    let graph = standard_graph().expect("standard graph");
    let state = graph.initial_state(&dataset);
    let registry = test_registry();

    let outputs = registry.recompute(&changed(&["city_rows", "ghost"]), &dataset, &state);
    assert_eq!(outputs.len(), 1);
}

#[test]
fn untouched_views_keep_identical_output() {
    let dataset = sample_dataset();
    let graph = standard_graph().expect("standard graph");
    let state = graph.initial_state(&dataset);
    let registry = test_registry();

    let before = registry.compute_all(&dataset, &state);

    let applied = state
        .apply(
            &graph,
            &dataset,
            selectors::CITY,
            SelectionValue::multi(["Santos"]),
        )
        .expect("apply city");
    let affected = registry.affected_by(&applied.changed);
    assert_eq!(affected, changed(&["city_rows"]));

    let after = registry.compute_all(&dataset, &applied.state);
    // Views that do not read the changed selector are bit-identical.
    assert_eq!(before[0], after[0]);
    assert_eq!(before[2], after[2]);
    assert_ne!(before[1], after[1]);
}
