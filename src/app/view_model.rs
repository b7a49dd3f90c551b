//! Responsible for transforming the `TreeState` into a `ViewModel`.
//!
//! This module prepares data specifically for a renderer: the visible rows in
//! display order, each with its depth and flags, plus the current status.

use serde::Serialize;

use super::events::ViewStatus;
use super::state::TreeState;
use crate::core::tree::walk_visible;
use crate::core::Node;

/// A serializable representation of the view for a renderer.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub repository: Option<String>,
    pub status: ViewStatus,
    pub rows: Vec<VisibleRow>,
}

/// One line of the rendered tree.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct VisibleRow {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub is_directory: bool,
    pub is_expanded: bool,
    /// A listing for this directory is outstanding.
    pub is_loading: bool,
    pub download_url: Option<String>,
}

/// Creates the complete `ViewModel` from the current `TreeState`.
pub fn generate_view(state: &TreeState) -> ViewModel {
    let mut rows = Vec::new();
    walk_visible(&state.forest, |node, depth| {
        let row = match node {
            Node::Directory(dir) => VisibleRow {
                name: dir.name.clone(),
                path: dir.path.clone(),
                depth,
                is_directory: true,
                is_expanded: dir.expanded,
                is_loading: state.in_flight.contains(&dir.path),
                download_url: None,
            },
            Node::File(file) => VisibleRow {
                name: file.name.clone(),
                path: file.path.clone(),
                depth,
                is_directory: false,
                is_expanded: false,
                is_loading: false,
                download_url: file.download_url.clone(),
            },
        };
        rows.push(row);
    });

    ViewModel {
        repository: state.repository.as_ref().map(ToString::to_string),
        status: state.status.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree;
    use crate::core::RepositoryId;

    #[test]
    fn test_rows_follow_expansion_and_loading() {
        let mut state = TreeState::default();
        state.begin_session(RepositoryId::new("o", "r"));
        let forest = tree::initialize(vec![
            Node::directory("src", "src"),
            Node::directory("docs", "docs"),
            Node::file("README.md", "README.md", Some("https://dl/README.md".into())),
        ]);
        let forest = tree::set_children(&forest, "src", vec![Node::file("lib.rs", "src/lib.rs", None)]).unwrap();
        state.forest = tree::set_expanded(&forest, "src", true).unwrap();
        state.in_flight.insert("docs".to_string());
        state.settle_status();

        let view = generate_view(&state);

        assert_eq!(view.repository.as_deref(), Some("o/r"));
        assert_eq!(
            view.status,
            ViewStatus::LoadingSubtree {
                path: "docs".to_string()
            }
        );
        let summary: Vec<(&str, usize, bool, bool)> = view
            .rows
            .iter()
            .map(|row| (row.path.as_str(), row.depth, row.is_expanded, row.is_loading))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("src", 0, true, false),
                ("src/lib.rs", 1, false, false),
                ("docs", 0, false, true),
                ("README.md", 0, false, false),
            ]
        );
        assert_eq!(view.rows[3].download_url.as_deref(), Some("https://dl/README.md"));
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let status = ViewStatus::SubtreeFailed {
            path: "src".to_string(),
            reason: "Rate limit exceeded".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "subtree_failed", "path": "src", "reason": "Rate limit exceeded"})
        );
    }
}
