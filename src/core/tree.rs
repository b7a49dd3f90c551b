//! The lazily-populated repository tree.
//!
//! A [`Forest`] is an immutable, reference-counted slice of sibling nodes.
//! Every mutation returns a new forest that rebuilds only the chain of sibling
//! arrays from the root down to the addressed directory; all other subtrees
//! are shared with the previous forest. Callers can therefore detect changes
//! with [`Arc::ptr_eq`] instead of comparing whole trees.
//!
//! Paths are the slash-joined names of a node's ancestors followed by its own
//! name (`"src/util/mod.rs"`). They are resolved by walking names level by
//! level; see [`locate`].

use std::sync::Arc;

use super::error::TreeError;
use super::provider::{ContentEntry, EntryKind};

/// An ordered sequence of sibling nodes with no containing node.
pub type Forest = Arc<[Node]>;

const SEPARATOR: char = '/';

/// A directory whose children are fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub name: String,
    pub path: String,
    /// Only meaningful when `fetched` is `true`.
    pub children: Forest,
    pub expanded: bool,
    /// `false` means the listing was never requested; `true` with no
    /// children means the directory is known to be empty.
    pub fetched: bool,
}

impl Directory {
    /// A collapsed directory whose listing has not been requested yet.
    pub fn unfetched(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: empty(),
            expanded: false,
            fetched: false,
        }
    }
}

/// A downloadable file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLeaf {
    pub name: String,
    pub path: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Arc<Directory>),
    File(Arc<FileLeaf>),
}

impl Node {
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Node::Directory(Arc::new(Directory::unfetched(name, path)))
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>, download_url: Option<String>) -> Self {
        Node::File(Arc::new(FileLeaf {
            name: name.into(),
            path: path.into(),
            download_url,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Directory(dir) => &dir.name,
            Node::File(file) => &file.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::Directory(dir) => &dir.path,
            Node::File(file) => &file.path,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir.as_ref()),
            Node::File(_) => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

impl From<ContentEntry> for Node {
    fn from(entry: ContentEntry) -> Self {
        match entry.kind {
            EntryKind::Directory => Node::directory(entry.name, entry.path),
            EntryKind::File => Node::file(entry.name, entry.path, entry.download_url),
        }
    }
}

/// Returns a forest with no nodes.
pub fn empty() -> Forest {
    Arc::from(Vec::new())
}

/// Builds a root forest from the given nodes, keeping their order verbatim.
pub fn initialize(children: Vec<Node>) -> Forest {
    Arc::from(children)
}

/// Resolves `path` to the directory it names.
///
/// Each segment is matched against the names of the current level and the
/// walk only descends through directories, so `"src/src"` finds a nested
/// directory named like its parent.
pub fn locate<'a>(root: &'a [Node], path: &str) -> Result<&'a Directory, TreeError> {
    let chain = resolve(root, path)?;
    let mut level = root;
    let mut found = None;
    for index in chain {
        let dir = level[index]
            .as_directory()
            .ok_or_else(|| TreeError::PathNotFound(path.to_string()))?;
        level = &dir.children[..];
        found = Some(dir);
    }
    found.ok_or_else(|| TreeError::PathNotFound(path.to_string()))
}

/// Returns a forest where the directory at `path` holds `children` and is
/// marked as fetched.
pub fn set_children(root: &Forest, path: &str, children: Vec<Node>) -> Result<Forest, TreeError> {
    let chain = resolve(root, path)?;
    Ok(rewrite(root, &chain, move |dir| Directory {
        children: Arc::from(children),
        fetched: true,
        ..dir.clone()
    }))
}

/// Returns a forest where only the `expanded` flag of the directory at
/// `path` differs. When the flag already has the requested value the same
/// forest reference is returned.
pub fn set_expanded(root: &Forest, path: &str, expanded: bool) -> Result<Forest, TreeError> {
    if locate(root, path)?.expanded == expanded {
        return Ok(root.clone());
    }
    let chain = resolve(root, path)?;
    Ok(rewrite(root, &chain, |dir| Directory {
        expanded,
        ..dir.clone()
    }))
}

/// Drops the cached listing of the directory at `path`, so the next
/// expansion fetches it again.
pub fn invalidate(root: &Forest, path: &str) -> Result<Forest, TreeError> {
    let chain = resolve(root, path)?;
    Ok(rewrite(root, &chain, |dir| Directory {
        children: empty(),
        expanded: false,
        fetched: false,
        ..dir.clone()
    }))
}

/// Collapses every expanded directory. Fetched listings are kept, and levels
/// with nothing to collapse are shared with the input.
pub fn collapse_all(level: &Forest) -> Forest {
    let mut changed = false;
    let nodes: Vec<Node> = level
        .iter()
        .map(|node| match node {
            Node::Directory(dir) => {
                let children = collapse_all(&dir.children);
                if dir.expanded || !Arc::ptr_eq(&children, &dir.children) {
                    changed = true;
                    Node::Directory(Arc::new(Directory {
                        children,
                        expanded: false,
                        ..(**dir).clone()
                    }))
                } else {
                    node.clone()
                }
            }
            Node::File(_) => node.clone(),
        })
        .collect();

    if changed {
        Arc::from(nodes)
    } else {
        level.clone()
    }
}

/// Visits the visible nodes in depth-first pre-order, passing each node
/// with its depth. Children of collapsed directories are skipped.
pub fn walk_visible<F>(root: &[Node], mut visit: F)
where
    F: FnMut(&Node, usize),
{
    walk_visible_at(root, 0, &mut visit);
}

fn walk_visible_at<F>(level: &[Node], depth: usize, visit: &mut F)
where
    F: FnMut(&Node, usize),
{
    for node in level {
        visit(node, depth);
        if let Node::Directory(dir) = node {
            if dir.expanded {
                walk_visible_at(&dir.children, depth + 1, visit);
            }
        }
    }
}

/// Translates a path into sibling indices from the root to the addressed
/// directory.
fn resolve(root: &[Node], path: &str) -> Result<Vec<usize>, TreeError> {
    if path.is_empty() {
        return Err(TreeError::PathNotFound(path.to_string()));
    }

    let mut chain = Vec::new();
    let mut level = root;
    let mut segments = path.split(SEPARATOR).peekable();

    while let Some(segment) = segments.next() {
        let directory = level
            .iter()
            .position(|node| node.is_directory() && node.name() == segment);

        match directory {
            Some(index) => {
                chain.push(index);
                if let Node::Directory(dir) = &level[index] {
                    level = &dir.children[..];
                }
            }
            None => {
                let is_file = level
                    .iter()
                    .any(|node| !node.is_directory() && node.name() == segment);
                return Err(if is_file && segments.peek().is_none() {
                    TreeError::NotADirectory(path.to_string())
                } else {
                    TreeError::PathNotFound(path.to_string())
                });
            }
        }
    }

    Ok(chain)
}

/// Rebuilds the sibling arrays along `chain`, replacing the final directory
/// with `update(old)`.
fn rewrite<F>(level: &Forest, chain: &[usize], update: F) -> Forest
where
    F: FnOnce(&Directory) -> Directory,
{
    let Some((&index, rest)) = chain.split_first() else {
        return level.clone();
    };
    let Node::Directory(dir) = &level[index] else {
        return level.clone();
    };

    let replacement = if rest.is_empty() {
        update(dir)
    } else {
        Directory {
            children: rewrite(&dir.children, rest, update),
            ..(**dir).clone()
        }
    };

    let mut nodes = level.to_vec();
    nodes[index] = Node::Directory(Arc::new(replacement));
    Arc::from(nodes)
}
