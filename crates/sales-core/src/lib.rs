//! Reactive aggregation core for the sales dashboard.
//!
//! A selection event mutates the filter state, the selector dependency
//! graph cascades domain updates and resets downstream, the view registry
//! determines the affected view set, and the aggregation engine
//! recomputes exactly those views from the immutable dataset. Processing
//! is single-threaded and synchronous: one event is fully handled before
//! the next is accepted.

pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod graph;
pub mod registry;
pub mod state;

pub use dashboard::{Dashboard, SelectionEvent, standard_graph, standard_registry};
pub use error::{DashboardError, Result};
pub use graph::{
    DefaultChoice, DomainFn, SelectorDefinition, SelectorGraph, SelectorGraphBuilder,
    SelectorKind,
};
pub use registry::{ComputeFn, ViewDefinition, ViewRegistry};
pub use state::{AppliedSelection, FilterState, SelectionValue};
