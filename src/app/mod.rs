//! The stateful side of the viewer: session bookkeeping, fetch orchestration
//! and the events a presentation layer listens to.

pub mod controller;
pub mod events;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod view_model;

pub use controller::{ControllerError, RootOutcome, ToggleOutcome, TreeController};
pub use events::{TreeEvent, ViewStatus};
pub use proxy::{EventProxy, LoggingProxy};
pub use view_model::{ViewModel, VisibleRow};
