//! Orchestrates loading and expansion of a repository tree.
//!
//! The controller owns the only authoritative forest reference (inside
//! [`TreeState`]) and changes it exclusively through the pure functions in
//! [`crate::core::tree`]. Provider calls happen without holding the state
//! lock; every completion re-reads the *current* state before merging, so
//! fetches for unrelated directories may finish in any order.

use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::events::ViewStatus;
use super::helpers::{lock_state, with_state_and_notify};
use super::proxy::EventProxy;
use super::state::{FetchTicket, TreeState};
use super::view_model::{generate_view, ViewModel};
use crate::core::tree::{self, Forest, Node};
use crate::core::{
    ContentEntry, ContentProvider, ProviderError, RepositoryId, SerializeOptions, TreeError,
    TreeSerializer,
};

#[derive(Debug, Error)]
pub enum ControllerError {
    /// The top-level listing failed; the view has nothing to show.
    #[error("Failed to load repository {repository}: {source}")]
    RootLoad {
        repository: RepositoryId,
        #[source]
        source: ProviderError,
    },

    /// A directory listing failed; only that directory is affected.
    #[error("Failed to load directory '{path}': {source}")]
    SubtreeLoad {
        path: String,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// What a call to [`TreeController::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Collapsed,
    /// Expanded from the cached listing, without a fetch.
    Expanded,
    /// Fetched the listing, merged it and expanded.
    Fetched,
    /// A fetch for this path was already outstanding; nothing was done.
    AlreadyInFlight,
    /// The fetch finished after the view moved to another session.
    Discarded,
}

/// What a call to [`TreeController::load_root`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOutcome {
    Loaded,
    /// A newer `load_root` started while this one was in flight.
    Superseded,
}

enum Step {
    Done(ToggleOutcome),
    Fetch(FetchTicket),
}

/// Drives one repository view.
///
/// Cloning is cheap and every clone operates on the same view, so expansions
/// can run as separate tasks.
pub struct TreeController<P: EventProxy> {
    provider: Arc<dyn ContentProvider>,
    proxy: P,
    state: Arc<Mutex<TreeState>>,
    options: SerializeOptions,
}

impl<P: EventProxy> Clone for TreeController<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            proxy: self.proxy.clone(),
            state: self.state.clone(),
            options: self.options.clone(),
        }
    }
}

impl<P: EventProxy> TreeController<P> {
    pub fn new(provider: Arc<dyn ContentProvider>, proxy: P) -> Self {
        Self {
            provider,
            proxy,
            state: Arc::new(Mutex::new(TreeState::default())),
            options: SerializeOptions::default(),
        }
    }

    /// Sets the formatting used by [`serialize`](Self::serialize).
    pub fn with_serialize_options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    /// The current forest. Later changes produce new references; this one
    /// never changes.
    pub fn snapshot(&self) -> Forest {
        lock_state(&self.state).forest.clone()
    }

    pub fn status(&self) -> ViewStatus {
        lock_state(&self.state).status.clone()
    }

    pub fn repository(&self) -> Option<RepositoryId> {
        lock_state(&self.state).repository.clone()
    }

    pub fn view(&self) -> ViewModel {
        generate_view(&lock_state(&self.state))
    }

    /// Serializes the visible part of the current forest.
    pub fn serialize(&self) -> String {
        TreeSerializer::serialize_with(&self.snapshot(), &self.options)
    }

    /// Replaces the view with the top-level listing of `owner/repo`.
    ///
    /// Everything cached for the previous repository is dropped immediately,
    /// and fetches still outstanding for it will be discarded on arrival.
    pub async fn load_root(&self, owner: &str, repo: &str) -> Result<RootOutcome, ControllerError> {
        let repository = RepositoryId::new(owner, repo);
        let session = with_state_and_notify(&self.state, &self.proxy, |s| {
            s.begin_session(repository.clone())
        });

        tracing::info!(
            "Loading root of {} from {}",
            repository,
            self.provider.identifier()
        );
        let result = self.provider.list_children(&repository, "").await;

        with_state_and_notify(&self.state, &self.proxy, |s| {
            if s.session != session {
                tracing::warn!(
                    "Discarding root listing of {}: a newer view was opened",
                    repository
                );
                return Ok(RootOutcome::Superseded);
            }

            match result {
                Ok(entries) => {
                    tracing::info!("Loaded {} top-level entries of {}", entries.len(), repository);
                    s.forest = tree::initialize(into_nodes(entries));
                    s.settle_status();
                    Ok(RootOutcome::Loaded)
                }
                Err(source) => {
                    tracing::error!("Failed to load root of {}: {}", repository, source);
                    s.status = ViewStatus::RootFailed {
                        reason: source.to_string(),
                    };
                    Err(ControllerError::RootLoad { repository, source })
                }
            }
        })
    }

    /// Expands or collapses the directory at `path`.
    ///
    /// Collapsing and re-expanding a fetched directory never touch the
    /// provider. An unfetched directory is fetched at most once at a time;
    /// a failed fetch leaves it collapsed and unfetched so it can be retried.
    pub async fn toggle(&self, path: &str) -> Result<ToggleOutcome, ControllerError> {
        let step = with_state_and_notify(&self.state, &self.proxy, |s| -> Result<Step, ControllerError> {
            let dir = tree::locate(&s.forest, path)?;
            let (expanded, fetched) = (dir.expanded, dir.fetched);

            if expanded {
                s.forest = tree::set_expanded(&s.forest, path, false)?;
                s.settle_status();
                return Ok(Step::Done(ToggleOutcome::Collapsed));
            }
            if fetched {
                tracing::debug!("Expanding '{}' from cache", path);
                s.forest = tree::set_expanded(&s.forest, path, true)?;
                s.settle_status();
                return Ok(Step::Done(ToggleOutcome::Expanded));
            }
            if s.in_flight.contains(path) {
                tracing::debug!("Listing of '{}' already in flight", path);
                return Ok(Step::Done(ToggleOutcome::AlreadyInFlight));
            }

            let ticket = s
                .ticket(path)
                .ok_or_else(|| TreeError::PathNotFound(path.to_string()))?;
            s.in_flight.insert(path.to_string());
            s.status = ViewStatus::LoadingSubtree {
                path: path.to_string(),
            };
            Ok(Step::Fetch(ticket))
        })?;

        let ticket = match step {
            Step::Done(outcome) => return Ok(outcome),
            Step::Fetch(ticket) => ticket,
        };

        let result = self.provider.list_children(&ticket.repository, path).await;
        self.complete_fetch(ticket, result)
    }

    /// Merges a finished listing into whatever the current forest is.
    fn complete_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<ContentEntry>, ProviderError>,
    ) -> Result<ToggleOutcome, ControllerError> {
        with_state_and_notify(&self.state, &self.proxy, |s| {
            if !s.is_current(&ticket) {
                tracing::warn!(
                    "Discarding listing of '{}' for {}: the view has changed",
                    ticket.path,
                    ticket.repository
                );
                return Ok(ToggleOutcome::Discarded);
            }
            s.in_flight.remove(&ticket.path);

            let entries = match result {
                Ok(entries) => entries,
                Err(source) => {
                    tracing::warn!("Failed to load '{}': {}", ticket.path, source);
                    s.status = ViewStatus::SubtreeFailed {
                        path: ticket.path.clone(),
                        reason: source.to_string(),
                    };
                    return Err(ControllerError::SubtreeLoad {
                        path: ticket.path,
                        source,
                    });
                }
            };

            let merged = tree::set_children(&s.forest, &ticket.path, into_nodes(entries))
                .and_then(|forest| tree::set_expanded(&forest, &ticket.path, true));
            s.settle_status();
            match merged {
                Ok(forest) => {
                    s.forest = forest;
                    Ok(ToggleOutcome::Fetched)
                }
                Err(err) => {
                    tracing::warn!("Dropping listing of '{}': {}", ticket.path, err);
                    Err(ControllerError::Tree(err))
                }
            }
        })
    }

    /// Expands every directory along `path`, fetching listings as needed.
    ///
    /// Returns `false` when the walk stopped early because a directory on
    /// the way was already being fetched or the view changed meanwhile.
    pub async fn reveal(&self, path: &str) -> Result<bool, ControllerError> {
        let mut prefix = String::new();
        for segment in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let expanded = {
                let state = lock_state(&self.state);
                tree::locate(&state.forest, &prefix)?.expanded
            };
            if expanded {
                continue;
            }
            match self.toggle(&prefix).await? {
                ToggleOutcome::Expanded | ToggleOutcome::Fetched => {}
                outcome => {
                    tracing::debug!("Stopped revealing '{}' at '{}': {:?}", path, prefix, outcome);
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Forgets the cached listing of `path`; the next expansion refetches it.
    pub fn invalidate(&self, path: &str) -> Result<(), ControllerError> {
        with_state_and_notify(&self.state, &self.proxy, |s| {
            s.forest = tree::invalidate(&s.forest, path)?;
            tracing::debug!("Invalidated '{}'", path);
            Ok(())
        })
    }

    /// Collapses every directory, keeping all cached listings.
    pub fn collapse_all(&self) {
        with_state_and_notify(&self.state, &self.proxy, |s| {
            s.forest = tree::collapse_all(&s.forest);
        });
    }
}

fn into_nodes(entries: Vec<ContentEntry>) -> Vec<Node> {
    entries.into_iter().map(Node::from).collect()
}
