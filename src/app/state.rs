//! Defines the authoritative state behind one repository view.

use std::collections::BTreeSet;

use super::events::ViewStatus;
use crate::core::tree::{self, Forest};
use crate::core::RepositoryId;

/// Identifies which view a fetch was issued for.
///
/// A completion is only merged when its ticket still matches the state,
/// which drops results that belong to a repository the user has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub repository: RepositoryId,
    pub session: u64,
    pub path: String,
}

/// Holds the complete, mutable state of a repository view.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` and shared by every
/// outstanding fetch of a [`TreeController`](super::controller::TreeController).
pub struct TreeState {
    /// The repository currently shown, if any.
    pub repository: Option<RepositoryId>,
    /// Incremented on every root load; tags in-flight requests.
    pub session: u64,
    /// The current forest. Replaced, never mutated in place.
    pub forest: Forest,
    /// Directories with an outstanding listing request.
    pub in_flight: BTreeSet<String>,
    pub status: ViewStatus,
}

impl Default for TreeState {
    fn default() -> Self {
        Self {
            repository: None,
            session: 0,
            forest: tree::empty(),
            in_flight: BTreeSet::new(),
            status: ViewStatus::Idle,
        }
    }
}

impl TreeState {
    /// Discards everything belonging to the previous repository and starts a
    /// new session. Returns the new session number.
    pub fn begin_session(&mut self, repository: RepositoryId) -> u64 {
        self.session += 1;
        self.repository = Some(repository);
        self.forest = tree::empty();
        self.in_flight.clear();
        self.status = ViewStatus::LoadingRoot;
        self.session
    }

    /// Issues a ticket for fetching `path` in the current session.
    pub fn ticket(&self, path: &str) -> Option<FetchTicket> {
        self.repository.as_ref().map(|repository| FetchTicket {
            repository: repository.clone(),
            session: self.session,
            path: path.to_string(),
        })
    }

    /// `true` when the ticket was issued for the view that is still shown.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.session == ticket.session && self.repository.as_ref() == Some(&ticket.repository)
    }

    /// Derives the status from the outstanding fetches.
    pub fn settle_status(&mut self) {
        self.status = match self.in_flight.iter().next() {
            Some(path) => ViewStatus::LoadingSubtree { path: path.clone() },
            None => ViewStatus::Idle,
        };
    }
}
