//! Error types for header maintenance and startup.

use std::path::PathBuf;
use thiserror::Error;

use crate::watcher::WatchError;

/// Per-file failures during a header rewrite.
///
/// These never escape [`HeaderEngine::update`](crate::HeaderEngine::update);
/// the file is left untouched and picked up again on its next event.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Decode { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while bootstrapping a session.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to create {path}: {source}")]
    ManifestCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create watchlist {path}: {source}")]
    Watchlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project root {path} is not accessible: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error(transparent)]
    Watch(#[from] WatchError),
}

impl SetupError {
    /// True for the one configuration failure that must halt the process.
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, SetupError::ManifestCreate { .. })
    }
}
