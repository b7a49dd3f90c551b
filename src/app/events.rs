//! Defines the messages sent from the tree controller to the presentation layer.

use serde::Serialize;

use crate::core::Forest;

/// What the view is currently doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    LoadingRoot,
    LoadingSubtree { path: String },
    /// The top-level listing failed; there is no tree to show.
    RootFailed { reason: String },
    /// A directory listing failed. The rest of the tree stays usable.
    SubtreeFailed { path: String, reason: String },
}

impl ViewStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ViewStatus::RootFailed { .. } | ViewStatus::SubtreeFailed { .. }
        )
    }
}

/// Events pushed to the presentation layer.
///
/// A `Snapshot` is only sent when the forest reference changed, so a
/// renderer can treat every one as "redraw".
#[derive(Debug, Clone)]
pub enum TreeEvent {
    Snapshot(Forest),
    Status(ViewStatus),
}
