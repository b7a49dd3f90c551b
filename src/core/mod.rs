pub mod error;
pub mod github;
pub mod provider;
pub mod serializer;
pub mod tree;

pub use error::{ProviderError, TreeError};
pub use github::{GithubContentProvider, RepositorySummary};
pub use provider::{ContentEntry, ContentProvider, EntryKind, RepositoryId};
pub use serializer::{SerializeOptions, TreeSerializer};
pub use tree::{Directory, FileLeaf, Forest, Node};
