pub mod cli;
pub mod config;
pub mod error;
pub mod header;
pub mod logging;
pub mod session;
pub mod tree;
pub mod utils;
pub mod watcher;
pub mod watchlist;

pub use config::Settings;
pub use error::{HeaderError, SetupError};
pub use header::{HeaderEngine, UpdateOutcome};
pub use session::{Preparation, RunningSession, Session};
pub use tree::TreeRenderer;
pub use watcher::{WatchCoordinator, WatchError};
pub use watchlist::{WatchEntry, WatchlistStore};
