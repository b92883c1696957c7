//! Bootstrap and lifecycle of a watching session.
//!
//! ```text
//! Session::new ─► prepare ─► start ─► RunningSession ─► stop
//!                  │           │
//!                  │           └─ subscribe, initial header pass, dispatcher thread
//!                  └─ manifest + watchlist on disk, missing-file report
//! ```

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::Settings;
use crate::error::SetupError;
use crate::header::{HeaderEngine, UpdateOutcome};
use crate::watcher::{NotifySubscriber, WatchCoordinator, WatchError};
use crate::watchlist::WatchEntry;

/// What [`Session::prepare`] found on disk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Preparation {
    pub manifest_created: bool,
    pub watchlist_created: bool,
    /// Entries listed in the watchlist that do not exist yet.
    pub missing: Vec<WatchEntry>,
    /// Number of entries in the watchlist.
    pub tracked: usize,
}

/// A configured project root, ready to be synced or watched.
pub struct Session {
    settings: Settings,
    engine: Arc<HeaderEngine>,
}

impl Session {
    /// Resolve the project root and build the header engine.
    pub fn new(settings: Settings) -> Result<Self, SetupError> {
        let root = settings.project_root();
        let root = root
            .canonicalize()
            .map_err(|source| SetupError::Root { path: root, source })?;

        settings.warn_clamped();
        let engine = Arc::new(HeaderEngine::from_settings(root, &settings));

        Ok(Self { settings, engine })
    }

    pub fn root(&self) -> &Path {
        self.engine.root()
    }

    pub fn engine(&self) -> &Arc<HeaderEngine> {
        &self.engine
    }

    /// Make sure the manifest and the watchlist exist and report entries
    /// that are listed but not on disk yet.
    ///
    /// Failing to create the manifest is fatal.
    pub fn prepare(&self) -> Result<Preparation, SetupError> {
        let manifest_created = self.engine.ensure_manifest()?;

        let store = self.engine.watchlist();
        let watchlist_created = store.ensure_exists().map_err(|source| SetupError::Watchlist {
            path: store.path().to_path_buf(),
            source,
        })?;
        if watchlist_created {
            crate::log_event!(
                "watchlist",
                "created",
                "{}; add relative file paths to track, one per line",
                self.engine.watchlist_name()
            );
        }

        let tracked = store.load().len();
        let missing = store.missing(self.engine.root());
        if !missing.is_empty() {
            let listed = missing
                .iter()
                .map(|entry| format!("  - {entry}"))
                .collect::<Vec<_>>()
                .join("\n");
            tracing::warn!(
                "[watchlist] the following files in {} do not exist:\n{listed}\nThese files will be watched once they are created.",
                self.engine.watchlist_name()
            );
        }

        Ok(Preparation {
            manifest_created,
            watchlist_created,
            missing,
            tracked,
        })
    }

    /// One-shot pass: header every existing tracked file and refresh the
    /// manifest, without subscribing to anything.
    pub fn sync(&self) -> Result<Vec<(WatchEntry, UpdateOutcome)>, SetupError> {
        self.prepare()?;

        let results = self
            .engine
            .watchlist()
            .load()
            .into_iter()
            .filter(|entry| entry.resolve(self.engine.root()).exists())
            .map(|entry| {
                let outcome = self.engine.update(Path::new(entry.as_str()));
                (entry, outcome)
            })
            .collect();

        self.engine.refresh_manifest();
        Ok(results)
    }

    /// Prepare the root, subscribe to the watchlist's directories, run the
    /// initial header pass and start dispatching events.
    pub fn start(&self) -> Result<RunningSession, SetupError> {
        let preparation = self.prepare()?;
        if preparation.tracked == 0 {
            crate::log_event!(
                "watchlist",
                "empty",
                "no files listed in {}. Add relative file paths, one per line. \
                 Starting watcher anyway to detect new additions...",
                self.engine.watchlist_name()
            );
        }

        let (subscriber, events) = NotifySubscriber::start()?;
        let coordinator = Arc::new(WatchCoordinator::new(
            Arc::clone(&self.engine),
            Arc::new(subscriber),
            self.settings.event_window(),
        ));
        coordinator.initialize();

        let dispatcher = coordinator
            .spawn_dispatcher(events)
            .map_err(|e| WatchError::InitFailed {
                reason: format!("failed to spawn event dispatcher: {e}"),
            })?;

        crate::log_event!("watcher", "started", "{}", self.engine.root().display());
        Ok(RunningSession {
            coordinator,
            dispatcher,
        })
    }
}

/// A live watch: subscriptions are held until [`stop`](Self::stop).
pub struct RunningSession {
    coordinator: Arc<WatchCoordinator>,
    dispatcher: JoinHandle<()>,
}

impl RunningSession {
    pub fn coordinator(&self) -> &Arc<WatchCoordinator> {
        &self.coordinator
    }

    /// Release every subscription and wait for the dispatcher to drain.
    pub fn stop(self) {
        self.coordinator.shutdown();
        if self.dispatcher.join().is_err() {
            tracing::error!("[watcher] event dispatcher panicked");
        }
        crate::debug_event!("watcher", "stopped");
    }
}
