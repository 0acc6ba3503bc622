//! Standard dashboard configuration and the event-driven facade.
//!
//! Wires the selector graph and view registry the sales dashboard uses:
//! a state selector cascading into a city multi-select for the five
//! shared views, an independent product selector for the monthly pivot,
//! and a second state/city pair for the per-transaction detail view.
//!
//! The five shared views filter the dataset by the city multi-select
//! alone; the state selector only shapes which cities can be chosen.
//! Clearing the city selection therefore yields the same aggregates as
//! never having filtered at all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use sales_model::{Dataset, Field, SalesRecord, ViewOutput};

use crate::aggregate;
use crate::error::Result;
use crate::graph::{DefaultChoice, SelectorGraph, SelectorGraphBuilder, SelectorKind};
use crate::registry::{ViewDefinition, ViewRegistry};
use crate::state::{FilterState, SelectionValue};

/// Selector ids of the standard dashboard.
pub mod selectors {
    /// Shapes the city domain for the shared views.
    pub const STATE: &str = "state";
    /// Multi-select filtering the shared dataset.
    pub const CITY: &str = "city";
    /// Product for the monthly pivot view.
    pub const PRODUCT: &str = "product";
    /// State half of the detail view's required pair.
    pub const DETAIL_STATE: &str = "detail_state";
    /// City half of the detail view's required pair.
    pub const DETAIL_CITY: &str = "detail_city";
}

/// View ids of the standard dashboard.
pub mod views {
    pub const MONTHLY_TOTALS: &str = "monthly_totals";
    pub const REPRESENTATIVE_SALES: &str = "representative_sales";
    pub const PRODUCT_TABLE: &str = "product_table";
    pub const REGION_SHARES: &str = "region_shares";
    pub const STATE_TOTALS: &str = "state_totals";
    pub const PRODUCT_MONTH_PIVOT: &str = "product_month_pivot";
    pub const STATE_CITY_SALES: &str = "state_city_sales";
}

/// One inbound selection event from the transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    #[serde(rename = "selectorId")]
    pub selector: String,
    pub value: SelectionValue,
}

impl SelectionEvent {
    pub fn single(selector: &str, value: &str) -> Self {
        Self {
            selector: selector.to_string(),
            value: SelectionValue::single(value),
        }
    }

    pub fn multi(selector: &str, values: &[&str]) -> Self {
        Self {
            selector: selector.to_string(),
            value: SelectionValue::multi(values.iter().copied()),
        }
    }
}

fn distinct_cities_of_state(dataset: &Dataset, state: Option<&str>) -> Vec<String> {
    let Some(state) = state else {
        return Vec::new();
    };
    let mut cities: Vec<String> = Vec::new();
    for record in dataset
        .records()
        .iter()
        .filter(|record: &&SalesRecord| record.customer_state == state)
    {
        if !cities.iter().any(|city| city == &record.customer_city) {
            cities.push(record.customer_city.clone());
        }
    }
    cities
}

/// The standard selector graph: `state -> city` for the shared filter,
/// an independent `product`, and `detail_state -> detail_city` for the
/// detail view.
pub fn standard_graph() -> Result<SelectorGraph> {
    SelectorGraphBuilder::new()
        .register_independent(
            selectors::STATE,
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            selectors::CITY,
            SelectorKind::Multi,
            &[selectors::STATE],
            DefaultChoice::Unset,
            |dataset, state| distinct_cities_of_state(dataset, state.single(selectors::STATE)),
        )
        .register_independent(
            selectors::PRODUCT,
            SelectorKind::Single,
            DefaultChoice::FirstInDomain,
            |dataset, _| dataset.column_values(Field::Product),
        )
        .register_independent(
            selectors::DETAIL_STATE,
            SelectorKind::Single,
            DefaultChoice::Fixed("SP".to_string()),
            |dataset, _| dataset.column_values(Field::State),
        )
        .register_dependent(
            selectors::DETAIL_CITY,
            SelectorKind::Single,
            &[selectors::DETAIL_STATE],
            DefaultChoice::FirstInDomain,
            |dataset, state| {
                distinct_cities_of_state(dataset, state.single(selectors::DETAIL_STATE))
            },
        )
        .build()
}

fn compute_monthly_totals(dataset: &Dataset, state: &FilterState) -> sales_model::AggregateResult {
    aggregate::monthly_totals(dataset, state.multi(selectors::CITY))
}

fn compute_representative_sales(
    dataset: &Dataset,
    state: &FilterState,
) -> sales_model::AggregateResult {
    aggregate::sales_by_representative(dataset, state.multi(selectors::CITY))
}

fn compute_product_table(dataset: &Dataset, state: &FilterState) -> sales_model::AggregateResult {
    aggregate::sales_by_product(dataset, state.multi(selectors::CITY))
}

fn compute_region_shares(dataset: &Dataset, state: &FilterState) -> sales_model::AggregateResult {
    aggregate::sales_by_region(dataset, state.multi(selectors::CITY))
}

fn compute_state_totals(dataset: &Dataset, state: &FilterState) -> sales_model::AggregateResult {
    aggregate::sales_by_state(dataset, state.multi(selectors::CITY))
}

fn compute_product_month_pivot(
    dataset: &Dataset,
    state: &FilterState,
) -> sales_model::AggregateResult {
    aggregate::sales_by_product_month(dataset, state.single(selectors::PRODUCT))
}

fn compute_state_city_sales(
    dataset: &Dataset,
    state: &FilterState,
) -> sales_model::AggregateResult {
    aggregate::sales_by_state_city(
        dataset,
        state.single(selectors::DETAIL_STATE),
        state.single(selectors::DETAIL_CITY),
    )
}

/// The standard view registry. The five shared views declare `city` as
/// their only input; the pivot reads `product` and the detail view reads
/// the `detail_state`/`detail_city` pair.
pub fn standard_registry() -> Result<ViewRegistry> {
    let mut registry = ViewRegistry::new();
    registry.register(ViewDefinition::new(
        views::MONTHLY_TOTALS,
        "Total Sales by Month",
        "Month",
        "Total Sales",
        &[selectors::CITY],
        compute_monthly_totals,
    ))?;
    registry.register(ViewDefinition::new(
        views::REPRESENTATIVE_SALES,
        "Total Sales by Representative",
        "Representative",
        "Total Sales",
        &[selectors::CITY],
        compute_representative_sales,
    ))?;
    registry.register(ViewDefinition::new(
        views::PRODUCT_TABLE,
        "Total Sales by Product",
        "Product",
        "Total Sales",
        &[selectors::CITY],
        compute_product_table,
    ))?;
    registry.register(ViewDefinition::new(
        views::REGION_SHARES,
        "Total Sales by Region",
        "Region",
        "Total Sales",
        &[selectors::CITY],
        compute_region_shares,
    ))?;
    registry.register(ViewDefinition::new(
        views::STATE_TOTALS,
        "Total Sales by State",
        "State",
        "Total Sales",
        &[selectors::CITY],
        compute_state_totals,
    ))?;
    registry.register(ViewDefinition::new(
        views::PRODUCT_MONTH_PIVOT,
        "Total Sales by Product and Month",
        "Month",
        "Total Sales",
        &[selectors::PRODUCT],
        compute_product_month_pivot,
    ))?;
    registry.register(ViewDefinition::new(
        views::STATE_CITY_SALES,
        "Total Sales by State and City",
        "Order Date",
        "Total Sales",
        &[selectors::DETAIL_STATE, selectors::DETAIL_CITY],
        compute_state_city_sales,
    ))?;
    Ok(registry)
}

/// Owns the dataset, graph, state, and registry, and processes one
/// selection event at a time: apply and commit the state transition, then
/// recompute exactly the affected views.
pub struct Dashboard {
    dataset: Dataset,
    graph: SelectorGraph,
    state: FilterState,
    registry: ViewRegistry,
}

impl Dashboard {
    /// Builds the standard dashboard over a loaded dataset.
    pub fn standard(dataset: Dataset) -> Result<Self> {
        let graph = standard_graph()?;
        let registry = standard_registry()?;
        let state = graph.initial_state(&dataset);
        Ok(Self {
            dataset,
            graph,
            state,
            registry,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn graph(&self) -> &SelectorGraph {
        &self.graph
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Processes one selection event end to end.
    ///
    /// On success the new state is committed and the recomputed outputs of
    /// the affected views are returned in registration order. On error the
    /// previous state stays committed and no view recomputes.
    pub fn select(&mut self, event: &SelectionEvent) -> Result<Vec<ViewOutput>> {
        let applied =
            self.state
                .apply(&self.graph, &self.dataset, &event.selector, event.value.clone())?;
        let affected = self.registry.affected_by(&applied.changed);
        self.state = applied.state;
        debug!(
            selector = %event.selector,
            changed = applied.changed.len(),
            affected = affected.len(),
            "selection event processed"
        );
        let mut outputs = self.registry.recompute(&affected, &self.dataset, &self.state);
        Ok(self
            .registry
            .views()
            .iter()
            .filter_map(|view| outputs.remove(&view.id))
            .collect())
    }

    /// Computes every view against the current state, for initial render.
    pub fn render_all(&self) -> Vec<ViewOutput> {
        self.registry.compute_all(&self.dataset, &self.state)
    }
}
