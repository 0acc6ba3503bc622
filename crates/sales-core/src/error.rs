use thiserror::Error;

/// Failures of the reactive core.
///
/// Configuration problems (`CyclicDependency`, `UnknownDependency`,
/// duplicates) are fatal at registration time. `InvalidSelection` is the
/// only runtime error and is recovered locally: the offending event is
/// rejected and the prior filter state stays committed.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("selector dependencies form a cycle involving: {0}")]
    CyclicDependency(String),
    #[error("selector `{selector}` depends on unregistered selector `{dependency}`")]
    UnknownDependency { selector: String, dependency: String },
    #[error("selector `{0}` registered twice")]
    DuplicateSelector(String),
    #[error("view `{0}` registered twice")]
    DuplicateView(String),
    #[error("unknown selector `{0}`")]
    UnknownSelector(String),
    #[error("invalid selection for `{selector}`: {reason}")]
    InvalidSelection { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
