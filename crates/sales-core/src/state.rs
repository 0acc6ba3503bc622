//! Filter state: the single source of truth driving every view.
//!
//! State is exclusively owned by its holder and only changes through
//! [`FilterState::apply`], which validates the event, runs the dependency
//! cascade on a working copy, and hands back the fully consistent result.
//! No observer ever sees a state where a dependent selection refers to an
//! option its upstream no longer offers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sales_model::Dataset;

use crate::error::{DashboardError, Result};
use crate::graph::SelectorGraph;

/// The current choice for one selector.
///
/// `Single(None)` and an empty `Multi` both mean "no constraint".
/// Serialized untagged so the transport event shape is a plain string or
/// an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Single(Option<String>),
    Multi(Vec<String>),
}

impl SelectionValue {
    pub fn single(value: impl Into<String>) -> Self {
        SelectionValue::Single(Some(value.into()))
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectionValue::Multi(values.into_iter().map(Into::into).collect())
    }

    /// True when the value places no constraint on the dataset.
    pub fn is_unconstrained(&self) -> bool {
        match self {
            SelectionValue::Single(value) => value.is_none(),
            SelectionValue::Multi(values) => values.is_empty(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            SelectionValue::Single(value) => value.as_deref(),
            SelectionValue::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[String]> {
        match self {
            SelectionValue::Single(_) => None,
            SelectionValue::Multi(values) => Some(values),
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            SelectionValue::Single(_) => "single",
            SelectionValue::Multi(_) => "multi",
        }
    }
}

/// Result of a committed [`FilterState::apply`] call: the new state plus
/// the ids of every selector whose value or domain changed in the
/// cascade.
#[derive(Debug, Clone)]
pub struct AppliedSelection {
    pub state: FilterState,
    pub changed: BTreeSet<String>,
}

/// Current values and domains of all selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    values: BTreeMap<String, SelectionValue>,
    domains: BTreeMap<String, Vec<String>>,
}

impl FilterState {
    pub fn value(&self, selector: &str) -> Option<&SelectionValue> {
        self.values.get(selector)
    }

    /// Current domain of a selector; empty for unknown selectors.
    pub fn domain(&self, selector: &str) -> &[String] {
        self.domains.get(selector).map_or(&[], Vec::as_slice)
    }

    /// The chosen value of a single-select, if any is set.
    pub fn single(&self, selector: &str) -> Option<&str> {
        self.values.get(selector).and_then(SelectionValue::as_single)
    }

    /// The chosen values of a multi-select; empty means unconstrained.
    pub fn multi(&self, selector: &str) -> &[String] {
        self.values
            .get(selector)
            .and_then(SelectionValue::as_multi)
            .unwrap_or(&[])
    }

    pub fn selector_ids(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(crate) fn set_value(&mut self, selector: &str, value: SelectionValue) {
        self.values.insert(selector.to_string(), value);
    }

    pub(crate) fn set_domain(&mut self, selector: &str, domain: Vec<String>) {
        self.domains.insert(selector.to_string(), domain);
    }

    /// Applies one selection event.
    ///
    /// Validates the value against the selector's current domain, then
    /// runs the cascade on a working copy. Either the whole transition is
    /// returned for commit, or the error leaves `self` untouched - there
    /// is no transiently inconsistent state in between.
    pub fn apply(
        &self,
        graph: &SelectorGraph,
        dataset: &Dataset,
        selector: &str,
        value: SelectionValue,
    ) -> Result<AppliedSelection> {
        let definition = graph
            .get(selector)
            .ok_or_else(|| DashboardError::UnknownSelector(selector.to_string()))?;
        if definition.kind().name() != value.kind_name() {
            return Err(DashboardError::InvalidSelection {
                selector: selector.to_string(),
                reason: format!(
                    "expected a {} value, got a {} value",
                    definition.kind().name(),
                    value.kind_name()
                ),
            });
        }

        let domain = self.domain(selector);
        let out_of_domain: Vec<&str> = match &value {
            SelectionValue::Single(Some(chosen)) if !domain.contains(chosen) => {
                vec![chosen.as_str()]
            }
            SelectionValue::Multi(chosen) => chosen
                .iter()
                .filter(|candidate| !domain.contains(*candidate))
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        };
        if !out_of_domain.is_empty() {
            return Err(DashboardError::InvalidSelection {
                selector: selector.to_string(),
                reason: format!("`{}` is not in the current domain", out_of_domain.join("`, `")),
            });
        }

        if self.value(selector) == Some(&value) {
            debug!(selector, "selection unchanged, nothing to cascade");
            return Ok(AppliedSelection {
                state: self.clone(),
                changed: BTreeSet::new(),
            });
        }

        let mut next = self.clone();
        next.set_value(selector, value);
        let mut changed = graph.cascade(dataset, &mut next, selector);
        changed.insert(selector.to_string());
        debug!(selector, cascaded = changed.len() - 1, "selection applied");
        Ok(AppliedSelection {
            state: next,
            changed,
        })
    }
}
