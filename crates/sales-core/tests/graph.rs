//! Tests for selector graph validation and cascading domain updates.

use chrono::NaiveDate;
use sales_core::{
    DashboardError, DefaultChoice, SelectionValue, SelectorGraphBuilder, SelectorKind,
};
use sales_model::{Dataset, Field, SalesRecord};

fn record(state: &str, city: &str) -> SalesRecord {
    SalesRecord {
        order_date: NaiveDate::from_ymd_opt(2023, 6, 1).expect("ymd"),
        customer_state: state.to_string(),
        customer_city: city.to_string(),
        representative_name: "Ana".to_string(),
        product_name: "Widget".to_string(),
        region: "South".to_string(),
        total_value: 10.0,
    }
}

fn two_state_dataset() -> Dataset {
    Dataset::new(vec![
        record("SP", "Santos"),
        record("SP", "Campinas"),
        record("RJ", "Niteroi"),
    ])
}

fn cities_of(dataset: &Dataset, state: Option<&str>) -> Vec<String> {
    let Some(state) = state else {
        return Vec::new();
    };
    let mut cities = Vec::new();
    for record in dataset.records() {
        if record.customer_state == state && !cities.contains(&record.customer_city) {
            cities.push(record.customer_city.clone());
        }
    }
    cities
}

#[test]
fn rejects_dependency_cycle() {
    let result = SelectorGraphBuilder::new()
        .register_dependent("a", SelectorKind::Single, &["b"], DefaultChoice::Unset, |_, _| {
            Vec::new()
        })
        .register_dependent("b", SelectorKind::Single, &["a"], DefaultChoice::Unset, |_, _| {
            Vec::new()
        })
        .build();
    assert!(matches!(result, Err(DashboardError::CyclicDependency(_))));
}

#[test]
fn rejects_self_dependency() {
    let result = SelectorGraphBuilder::new()
        .register_dependent("a", SelectorKind::Single, &["a"], DefaultChoice::Unset, |_, _| {
            Vec::new()
        })
        .build();
    assert!(matches!(result, Err(DashboardError::CyclicDependency(_))));
}

#[test]
fn rejects_unknown_dependency() {
    let result = SelectorGraphBuilder::new()
        .register_dependent(
            "a",
            SelectorKind::Single,
            &["missing"],
            DefaultChoice::Unset,
            |_, _| Vec::new(),
        )
        .build();
    match result {
        Err(DashboardError::UnknownDependency {
            selector,
            dependency,
        }) => {
            assert_eq!(selector, "a");
            assert_eq!(dependency, "missing");
        }
        other => panic!("unexpected result: {:?}", other.err()),
    }
}

#[test]
fn rejects_duplicate_selector() {
    let result = SelectorGraphBuilder::new()
        .register_independent("a", SelectorKind::Single, DefaultChoice::Unset, |_, _| {
            Vec::new()
        })
        .register_independent("a", SelectorKind::Single, DefaultChoice::Unset, |_, _| {
            Vec::new()
        })
        .build();
    assert!(matches!(result, Err(DashboardError::DuplicateSelector(id)) if id == "a"));
}

#[test]
fn registration_order_does_not_constrain_dependencies() {
    // The dependent is registered before the selector it depends on.
    let graph = SelectorGraphBuilder::new()
        .register_dependent(
            "city",
            SelectorKind::Single,
            &["state"],
            DefaultChoice::FirstInDomain,
            |dataset, state| cities_of(dataset, state.single("state")),
        )
        .register_independent(
            "state",
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .build()
        .expect("valid graph");

    let state = graph.initial_state(&two_state_dataset());
    // The city domain was still computed after the state default existed.
    assert_eq!(state.single("state"), Some("SP"));
    assert_eq!(state.domain("city"), ["Santos", "Campinas"]);
}

#[test]
fn initial_state_applies_defaults_in_topological_order() {
    let graph = SelectorGraphBuilder::new()
        .register_independent(
            "state",
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            "city",
            SelectorKind::Multi,
            &["state"],
            DefaultChoice::Unset,
            |dataset, state| cities_of(dataset, state.single("state")),
        )
        .build()
        .expect("valid graph");

    let state = graph.initial_state(&two_state_dataset());
    assert_eq!(state.single("state"), Some("SP"));
    assert_eq!(state.domain("city"), ["Santos", "Campinas"]);
    assert!(state.multi("city").is_empty());
}

#[test]
fn cascade_propagates_two_hops_downstream() {
    // state -> city -> zone: a change to state must flow through city
    // into zone even though state is two hops upstream of zone.
    let dataset = two_state_dataset();
    let graph = SelectorGraphBuilder::new()
        .register_independent(
            "state",
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            "city",
            SelectorKind::Single,
            &["state"],
            DefaultChoice::FirstInDomain,
            |dataset, state| cities_of(dataset, state.single("state")),
        )
        .register_dependent(
            "zone",
            SelectorKind::Single,
            &["city"],
            DefaultChoice::FirstInDomain,
            |_, state| {
                state
                    .single("city")
                    .map(|city| vec![format!("{city}-north"), format!("{city}-south")])
                    .unwrap_or_default()
            },
        )
        .build()
        .expect("valid graph");

    let state = graph.initial_state(&dataset);
    assert_eq!(state.single("city"), Some("Santos"));
    assert_eq!(state.single("zone"), Some("Santos-north"));

    let applied = state
        .apply(&graph, &dataset, "state", SelectionValue::single("RJ"))
        .expect("apply state change");
    let expected: std::collections::BTreeSet<String> = ["state", "city", "zone"]
        .iter()
        .map(|id| (*id).to_string())
        .collect();
    assert_eq!(applied.changed, expected);
    assert_eq!(applied.state.single("city"), Some("Niteroi"));
    assert_eq!(applied.state.domain("zone"), ["Niteroi-north", "Niteroi-south"]);
    assert_eq!(applied.state.single("zone"), Some("Niteroi-north"));
}

#[test]
fn multi_select_resets_to_empty_on_upstream_change() {
    let dataset = two_state_dataset();
    let graph = SelectorGraphBuilder::new()
        .register_independent(
            "state",
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            "city",
            SelectorKind::Multi,
            &["state"],
            DefaultChoice::Unset,
            |dataset, state| cities_of(dataset, state.single("state")),
        )
        .build()
        .expect("valid graph");

    let state = graph.initial_state(&dataset);
    let applied = state
        .apply(
            &graph,
            &dataset,
            "city",
            SelectionValue::multi(["Santos", "Campinas"]),
        )
        .expect("apply city selection");
    let applied = applied
        .state
        .apply(&graph, &dataset, "state", SelectionValue::single("RJ"))
        .expect("apply state change");

    assert_eq!(applied.state.domain("city"), ["Niteroi"]);
    assert!(applied.state.multi("city").is_empty());
}

#[test]
fn valid_dependent_selection_survives_an_upstream_noop() {
    // Reapplying the same state value leaves the city selection alone.
    let dataset = two_state_dataset();
    let graph = SelectorGraphBuilder::new()
        .register_independent(
            "state",
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            "city",
            SelectorKind::Multi,
            &["state"],
            DefaultChoice::Unset,
            |dataset, state| cities_of(dataset, state.single("state")),
        )
        .build()
        .expect("valid graph");

    let state = graph.initial_state(&dataset);
    let applied = state
        .apply(&graph, &dataset, "city", SelectionValue::multi(["Santos"]))
        .expect("apply city selection");
    let reapplied = applied
        .state
        .apply(&graph, &dataset, "state", SelectionValue::single("SP"))
        .expect("reapply same state");

    assert!(reapplied.changed.is_empty());
    assert_eq!(reapplied.state.multi("city"), ["Santos"]);
}
