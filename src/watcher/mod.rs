//! Filesystem watching for header maintenance.
//!
//! A single `notify::RecommendedWatcher` feeds events through a channel to
//! the coordinator, which debounces, classifies and acts on them.
//!
//! # Architecture
//!
//! ```text
//! NotifySubscriber (notify::RecommendedWatcher)
//!         |  crossbeam channel
//!         v
//! WatchCoordinator
//!   - fine Debouncer (per path)
//!   - DirectorySet (monotonic)
//!         |
//!    +----+-------------+
//!    |                  |
//! reconcile()     HeaderEngine::update()
//!                 HeaderEngine::refresh_manifest()
//! ```

mod action;
mod coordinator;
mod debouncer;
mod directories;
mod error;
mod event;
mod subscriber;

pub use action::{IgnoreReason, WatchAction};
pub use coordinator::{ReconcileReport, WatchCoordinator};
pub use debouncer::Debouncer;
pub use directories::{DirectorySet, ROOT_DIR};
pub use error::WatchError;
pub use event::{FsEvent, FsEventKind};
pub use subscriber::{DirectorySubscriber, NotifySubscriber};
