//! Explicitly owned state container for one interactive workflow.
//!
//! A [`StateCtx`] holds one value per [`State`] type, notifies subscribers after
//! every change, and runs async [`Command`]s whose results are applied only while
//! the task that produced them is still the newest of its kind.

mod command;
mod ctx;
mod error;
mod snapshot;
mod state;
mod task;

pub use command::{Command, CommandFuture};
pub use ctx::{StateCtx, SubscriptionId};
pub use error::StateError;
pub use snapshot::CommandSnapshot;
pub use state::{LatestOnlyUpdater, State, Updater};
pub use task::{TaskHandle, TaskId};

// Re-exported so command implementations need no direct dependency.
pub use tokio_util::sync::CancellationToken;
