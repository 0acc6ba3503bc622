//! Selector dependency graph with declared edges and validated topology.
//!
//! Selectors are registered up front: independent selectors derive their
//! option domain from the dataset alone, dependent selectors also read
//! other selectors' current values. `build` validates the declarations
//! form a DAG and fixes the evaluation order once, so a change two hops
//! upstream cascades through intermediate dependents deterministically.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use sales_model::Dataset;

use crate::error::{DashboardError, Result};
use crate::state::{FilterState, SelectionValue};

/// Computes a selector's valid option set from the dataset and the
/// current upstream selections.
pub type DomainFn = Box<dyn Fn(&Dataset, &FilterState) -> Vec<String> + Send + Sync>;

/// Whether a selector holds one value or a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Single,
    Multi,
}

impl SelectorKind {
    pub fn name(self) -> &'static str {
        match self {
            SelectorKind::Single => "single",
            SelectorKind::Multi => "multi",
        }
    }
}

/// Initial value policy, evaluated against the freshly computed domain.
///
/// Multi-selects always start unconstrained; the policy applies to
/// single-selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultChoice {
    /// The domain's first element, or no selection for an empty domain.
    FirstInDomain,
    /// A fixed value, falling back to the domain's first element when the
    /// value is not offered by this dataset.
    Fixed(String),
    /// No initial selection.
    Unset,
}

/// A registered selector: identity, arity, dependencies, domain function,
/// and default policy. Static configuration, never mutated at runtime.
pub struct SelectorDefinition {
    id: String,
    kind: SelectorKind,
    depends_on: Vec<String>,
    domain: DomainFn,
    default: DefaultChoice,
}

impl SelectorDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn default_value(&self, domain: &[String]) -> SelectionValue {
        match self.kind {
            SelectorKind::Multi => SelectionValue::Multi(Vec::new()),
            SelectorKind::Single => match &self.default {
                DefaultChoice::FirstInDomain => {
                    SelectionValue::Single(domain.first().cloned())
                }
                DefaultChoice::Fixed(value) => {
                    if domain.contains(value) {
                        SelectionValue::Single(Some(value.clone()))
                    } else {
                        SelectionValue::Single(domain.first().cloned())
                    }
                }
                DefaultChoice::Unset => SelectionValue::Single(None),
            },
        }
    }

    /// Reset action when an upstream change invalidates the current
    /// value: first element for single-selects, empty set for
    /// multi-selects.
    fn reset_value(&self, domain: &[String]) -> SelectionValue {
        match self.kind {
            SelectorKind::Single => SelectionValue::Single(domain.first().cloned()),
            SelectorKind::Multi => SelectionValue::Multi(Vec::new()),
        }
    }
}

/// Registration-time builder for [`SelectorGraph`].
#[derive(Default)]
pub struct SelectorGraphBuilder {
    selectors: Vec<SelectorDefinition>,
}

impl SelectorGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a selector whose domain depends only on the dataset.
    pub fn register_independent<F>(
        self,
        id: &str,
        kind: SelectorKind,
        default: DefaultChoice,
        domain: F,
    ) -> Self
    where
        F: Fn(&Dataset, &FilterState) -> Vec<String> + Send + Sync + 'static,
    {
        self.register(id, kind, &[], default, domain)
    }

    /// Registers a selector whose domain also reads upstream selections.
    pub fn register_dependent<F>(
        self,
        id: &str,
        kind: SelectorKind,
        depends_on: &[&str],
        default: DefaultChoice,
        domain: F,
    ) -> Self
    where
        F: Fn(&Dataset, &FilterState) -> Vec<String> + Send + Sync + 'static,
    {
        self.register(id, kind, depends_on, default, domain)
    }

    fn register<F>(
        mut self,
        id: &str,
        kind: SelectorKind,
        depends_on: &[&str],
        default: DefaultChoice,
        domain: F,
    ) -> Self
    where
        F: Fn(&Dataset, &FilterState) -> Vec<String> + Send + Sync + 'static,
    {
        self.selectors.push(SelectorDefinition {
            id: id.to_string(),
            kind,
            depends_on: depends_on.iter().map(|dep| (*dep).to_string()).collect(),
            domain: Box::new(domain),
            default,
        });
        self
    }

    /// Validates the declarations and computes the topological evaluation
    /// order once. Fails with [`DashboardError::CyclicDependency`] if the
    /// edges do not form a DAG.
    pub fn build(self) -> Result<SelectorGraph> {
        let mut index = BTreeMap::new();
        for (position, selector) in self.selectors.iter().enumerate() {
            if index.insert(selector.id.clone(), position).is_some() {
                return Err(DashboardError::DuplicateSelector(selector.id.clone()));
            }
        }
        for selector in &self.selectors {
            for dependency in &selector.depends_on {
                if !index.contains_key(dependency) {
                    return Err(DashboardError::UnknownDependency {
                        selector: selector.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        // Kahn's algorithm, preferring registration order among ready nodes.
        let count = self.selectors.len();
        let mut indegree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (position, selector) in self.selectors.iter().enumerate() {
            indegree[position] = selector.depends_on.len();
            for dependency in &selector.depends_on {
                dependents[index[dependency]].push(position);
            }
        }
        let mut ready: Vec<usize> = (0..count).filter(|&p| indegree[p] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(position) = ready.first().copied() {
            ready.remove(0);
            order.push(position);
            for &dependent in &dependents[position] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.push(dependent);
                    ready.sort_unstable();
                }
            }
        }
        if order.len() < count {
            let stuck: Vec<&str> = (0..count)
                .filter(|&p| indegree[p] > 0)
                .map(|p| self.selectors[p].id.as_str())
                .collect();
            return Err(DashboardError::CyclicDependency(stuck.join(", ")));
        }

        debug!(selectors = count, "selector graph validated");
        Ok(SelectorGraph {
            selectors: self.selectors,
            index,
            order,
        })
    }
}

/// The validated dependency graph with its fixed evaluation order.
pub struct SelectorGraph {
    selectors: Vec<SelectorDefinition>,
    index: BTreeMap<String, usize>,
    /// Topological evaluation order, computed once at build time.
    order: Vec<usize>,
}

impl SelectorGraph {
    pub fn get(&self, selector: &str) -> Option<&SelectorDefinition> {
        self.index.get(selector).map(|&position| &self.selectors[position])
    }

    pub fn selector_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&position| self.selectors[position].id())
    }

    /// Computes every domain in dependency order and applies default
    /// values, yielding the startup filter state.
    pub fn initial_state(&self, dataset: &Dataset) -> FilterState {
        let mut state = FilterState::default();
        for &position in &self.order {
            let selector = &self.selectors[position];
            let domain = (selector.domain)(dataset, &state);
            let value = selector.default_value(&domain);
            state.set_domain(&selector.id, domain);
            state.set_value(&selector.id, value);
        }
        state
    }

    /// Propagates one upstream change through every downstream selector in
    /// topological order.
    ///
    /// Recomputes each affected domain and resets any selection the new
    /// domain no longer offers, mutating `state` in place. Returns the ids
    /// of selectors whose domain or value changed (excluding the root).
    pub(crate) fn cascade(
        &self,
        dataset: &Dataset,
        state: &mut FilterState,
        changed_root: &str,
    ) -> BTreeSet<String> {
        let mut dirty: BTreeSet<&str> = BTreeSet::new();
        dirty.insert(changed_root);
        let mut changed = BTreeSet::new();

        for &position in &self.order {
            let selector = &self.selectors[position];
            let upstream_dirty = selector
                .depends_on
                .iter()
                .any(|dependency| dirty.contains(dependency.as_str()));
            if !upstream_dirty {
                continue;
            }

            let domain = (selector.domain)(dataset, state);
            let domain_changed = state.domain(&selector.id) != domain.as_slice();

            let invalidated = match state.value(&selector.id) {
                Some(SelectionValue::Single(Some(value))) => !domain.contains(value),
                Some(SelectionValue::Multi(values)) => {
                    values.iter().any(|value| !domain.contains(value))
                }
                _ => false,
            };

            if invalidated {
                let reset = selector.reset_value(&domain);
                debug!(selector = %selector.id, "selection invalidated by upstream change, reset");
                state.set_value(&selector.id, reset);
            }
            if domain_changed {
                state.set_domain(&selector.id, domain);
            }
            if domain_changed || invalidated {
                dirty.insert(selector.id.as_str());
                changed.insert(selector.id.clone());
            }
        }
        changed
    }
}
