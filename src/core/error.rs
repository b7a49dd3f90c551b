//! Defines the error types for the `core` module.

use thiserror::Error;

/// Failures reported by a [`ContentProvider`](super::ContentProvider).
///
/// The variants follow what a remote content API can tell us: the path is
/// absent, access was refused, or the service could not answer right now.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The repository or the requested path does not exist.
    #[error("Repository or path not found: {0}")]
    NotFound(String),

    /// The provider refused access (missing or insufficient credentials).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// The provider's request quota is exhausted.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Transport failure, timeout or server-side error.
    #[error("Content provider unavailable: {0}")]
    Unavailable(String),

    /// The requested path exists but names a file, not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    /// The provider answered with something we could not decode.
    #[error("Invalid response from content provider: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Returns `true` for failures that may go away on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::Unavailable(_))
    }
}

/// Errors raised by the pure tree operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// No directory exists at the given path in the current forest.
    #[error("No directory at path: {0}")]
    PathNotFound(String),

    /// The path resolves to a file where a directory was required.
    #[error("Path addresses a file, not a directory: {0}")]
    NotADirectory(String),
}
