//! Defines an abstraction over the event sending mechanism.

use super::events::{TreeEvent, ViewStatus};
use tokio::sync::mpsc::UnboundedSender;

/// A trait that abstracts the sending of tree events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: TreeEvent);
}

/// Forwards events into a tokio channel drained by the presentation layer.
impl EventProxy for UnboundedSender<TreeEvent> {
    fn send_event(&self, event: TreeEvent) {
        // A dropped receiver only means nobody is rendering any more.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to send tree event: {}", e);
        }
    }
}

/// Reports status changes through `tracing`, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProxy;

impl EventProxy for LoggingProxy {
    fn send_event(&self, event: TreeEvent) {
        match event {
            TreeEvent::Snapshot(forest) => {
                tracing::debug!("Tree updated: {} top-level entries", forest.len());
            }
            TreeEvent::Status(ViewStatus::RootFailed { reason }) => {
                tracing::error!("Repository could not be loaded: {}", reason);
            }
            TreeEvent::Status(ViewStatus::SubtreeFailed { path, reason }) => {
                tracing::warn!("Directory '{}' could not be loaded: {}", path, reason);
            }
            TreeEvent::Status(status) => tracing::debug!("Status: {:?}", status),
        }
    }
}
