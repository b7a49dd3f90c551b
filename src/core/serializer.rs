//! Linearizes the visible part of a repository tree into indented text.

use super::tree::{walk_visible, Node};

/// Formatting knobs for [`TreeSerializer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Spaces per depth level.
    pub indent_width: usize,
    /// Prefix for directory lines. An empty marker emits the bare name.
    pub directory_marker: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            directory_marker: String::new(),
        }
    }
}

/// Turns a forest into "what you see" text for the clipboard.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeSerializer;

impl TreeSerializer {
    /// Serializes with the default options: two-space indent, no marker.
    pub fn serialize(root: &[Node]) -> String {
        Self::serialize_with(root, &SerializeOptions::default())
    }

    /// Emits one line per visible node in depth-first pre-order.
    ///
    /// Children of collapsed directories produce no lines at all, and the
    /// `fetched` flag is never consulted: an expanded directory without
    /// children is just its own line.
    pub fn serialize_with(root: &[Node], options: &SerializeOptions) -> String {
        let mut result = String::new();

        walk_visible(root, |node, depth| {
            let indent = " ".repeat(depth * options.indent_width);
            match node {
                Node::Directory(dir) if !options.directory_marker.is_empty() => {
                    result.push_str(&format!(
                        "{indent}{} {}\n",
                        options.directory_marker, dir.name
                    ));
                }
                _ => result.push_str(&format!("{indent}{}\n", node.name())),
            }
        });

        result
    }
}
