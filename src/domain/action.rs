//! Upload semantics of push requests

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How the hub merges pushed records into the operator's data set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// Replace the operator's entire data set
    #[display("fullLoad")]
    FullLoad,
    #[display("update")]
    Update,
    #[display("insert")]
    Insert,
    #[display("delete")]
    Delete,
}

impl ActionType {
    pub fn is_incremental(self) -> bool {
        !matches!(self, Self::FullLoad)
    }
}
