//! View registry: which views exist, which selectors each one reads, and
//! fine-grained recomputation of only the affected subset.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use sales_model::{AggregateResult, Dataset, ViewOutput};

use crate::error::{DashboardError, Result};
use crate::state::FilterState;

/// Computes one view's aggregate from the dataset and filter state.
pub type ComputeFn = fn(&Dataset, &FilterState) -> AggregateResult;

/// Static configuration for one output view: identity, presentation
/// labels for the rendering collaborator, the selector ids the compute
/// function reads, and the compute function itself.
pub struct ViewDefinition {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub inputs: BTreeSet<String>,
    pub compute: ComputeFn,
}

impl ViewDefinition {
    pub fn new(
        id: &str,
        title: &str,
        x_label: &str,
        y_label: &str,
        inputs: &[&str],
        compute: ComputeFn,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            inputs: inputs.iter().map(|input| (*input).to_string()).collect(),
            compute,
        }
    }

    fn output(&self, dataset: &Dataset, state: &FilterState) -> ViewOutput {
        ViewOutput {
            view: self.id.clone(),
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            result: (self.compute)(dataset, state),
        }
    }
}

/// All registered views, in registration order.
#[derive(Default)]
pub struct ViewRegistry {
    views: Vec<ViewDefinition>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, view: ViewDefinition) -> Result<()> {
        if self.views.iter().any(|existing| existing.id == view.id) {
            return Err(DashboardError::DuplicateView(view.id));
        }
        self.views.push(view);
        Ok(())
    }

    pub fn views(&self) -> &[ViewDefinition] {
        &self.views
    }

    pub fn get(&self, id: &str) -> Option<&ViewDefinition> {
        self.views.iter().find(|view| view.id == id)
    }

    /// Ids of views whose inputs intersect the changed selector set.
    /// Views reading only untouched selectors keep their last output.
    pub fn affected_by(&self, changed: &BTreeSet<String>) -> BTreeSet<String> {
        self.views
            .iter()
            .filter(|view| view.inputs.iter().any(|input| changed.contains(input)))
            .map(|view| view.id.clone())
            .collect()
    }

    /// Recomputes exactly the requested views. Unknown ids are skipped.
    pub fn recompute(
        &self,
        ids: &BTreeSet<String>,
        dataset: &Dataset,
        state: &FilterState,
    ) -> BTreeMap<String, ViewOutput> {
        let mut outputs = BTreeMap::new();
        for view in &self.views {
            if ids.contains(&view.id) {
                outputs.insert(view.id.clone(), view.output(dataset, state));
            }
        }
        debug!(requested = ids.len(), recomputed = outputs.len(), "views recomputed");
        outputs
    }

    /// Computes every view, in registration order.
    pub fn compute_all(&self, dataset: &Dataset, state: &FilterState) -> Vec<ViewOutput> {
        self.views
            .iter()
            .map(|view| view.output(dataset, state))
            .collect()
    }
}
