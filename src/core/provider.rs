//! The content provider seam: anything that can list the immediate children
//! of a path inside a repository.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ProviderError;

/// Identifies the repository a view is showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child returned by a provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Full path from the repository root, exactly as the provider reports it.
    pub path: String,
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn file(name: &str, path: &str, download_url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::File,
            path: path.to_string(),
            download_url: download_url.map(str::to_string),
        }
    }

    pub fn directory(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Directory,
            path: path.to_string(),
            download_url: None,
        }
    }
}

/// Lists the immediate children of a path in a repository.
///
/// `path = ""` denotes the repository root. Implementations must keep the
/// order the backend returns and must report a missing path as
/// [`ProviderError::NotFound`] rather than as an empty listing.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn list_children(
        &self,
        repository: &RepositoryId,
        path: &str,
    ) -> Result<Vec<ContentEntry>, ProviderError>;

    /// Human-readable name for logging.
    fn identifier(&self) -> String;
}
