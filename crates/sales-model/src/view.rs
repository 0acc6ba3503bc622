use serde::{Deserialize, Serialize};

use crate::result::{AggregateResult, ResultKind};

/// The outbound payload for one view: the computed aggregate plus the
/// title and axis labels the rendering collaborator needs to produce a
/// chart without inspecting raw rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub view: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(flatten)]
    pub result: AggregateResult,
}

impl ViewOutput {
    pub fn kind(&self) -> ResultKind {
        self.result.kind()
    }
}
