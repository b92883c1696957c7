//! Turns raw filesystem notifications into header updates.
//!
//! Each event is fine-debounced per path, then classified: a change to the
//! watchlist triggers reconciliation, a change to a tracked file triggers a
//! header rewrite followed by a manifest refresh, anything else is ignored.

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use indexmap::IndexSet;
use parking_lot::Mutex;

use super::action::{IgnoreReason, WatchAction};
use super::debouncer::Debouncer;
use super::directories::DirectorySet;
use super::event::FsEvent;
use super::subscriber::DirectorySubscriber;
use crate::header::{HeaderEngine, UpdateOutcome};
use crate::watchlist::WatchEntry;

/// Snapshot of what the coordinator currently tracks.
#[derive(Debug, Default)]
struct WatchState {
    /// Watchlist contents as of the last reconciliation.
    snapshot: IndexSet<WatchEntry>,
    /// Directories subscribed so far. Never shrinks.
    directories: DirectorySet,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries present now that were not in the previous snapshot.
    pub added: Vec<WatchEntry>,
    /// Directories that entered the watched set during this pass.
    pub new_directories: Vec<String>,
    /// Header update results for the added entries that exist on disk.
    pub updated: Vec<(WatchEntry, UpdateOutcome)>,
}

/// Consumes filesystem events and keeps headers and subscriptions current.
pub struct WatchCoordinator {
    engine: Arc<HeaderEngine>,
    subscriber: Arc<dyn DirectorySubscriber>,
    /// Fine per-path window applied before classification.
    events: Debouncer,
    state: Mutex<WatchState>,
}

impl WatchCoordinator {
    pub fn new(
        engine: Arc<HeaderEngine>,
        subscriber: Arc<dyn DirectorySubscriber>,
        event_window: Duration,
    ) -> Self {
        Self {
            engine,
            subscriber,
            events: Debouncer::new(event_window),
            state: Mutex::new(WatchState::default()),
        }
    }

    pub fn engine(&self) -> &Arc<HeaderEngine> {
        &self.engine
    }

    /// Initial pass: subscribe to the watchlist's directories, write headers
    /// for every tracked file that exists and refresh the manifest.
    pub fn initialize(&self) {
        let current: IndexSet<WatchEntry> = self.engine.watchlist().load().into_iter().collect();

        let mut state = self.state.lock();
        state.directories.extend(&current);
        self.subscribe_all(&state.directories);

        for entry in &current {
            if entry.resolve(self.engine.root()).exists() {
                self.engine.update(Path::new(entry.as_str()));
            }
        }

        state.snapshot = current;
        drop(state);

        self.engine.refresh_manifest();
    }

    /// Decide what to do with `event`, applying the fine debounce window.
    pub fn classify(&self, event: &FsEvent) -> WatchAction {
        if event.is_dir {
            return WatchAction::Ignore {
                reason: IgnoreReason::Directory,
            };
        }

        let Some(rel) = self.engine.relative(&event.path) else {
            return WatchAction::Ignore {
                reason: IgnoreReason::OutsideRoot,
            };
        };

        if !self.events.admit(&rel) {
            return WatchAction::Ignore {
                reason: IgnoreReason::Debounced,
            };
        }

        let basename = rel.rsplit('/').next().unwrap_or(&rel);
        if basename == self.engine.watchlist_name() {
            return WatchAction::Reconcile;
        }

        if self.engine.should_process(Path::new(&rel)) {
            return WatchAction::UpdateHeader {
                entry: WatchEntry::from(rel.as_str()),
            };
        }

        WatchAction::Ignore {
            reason: IgnoreReason::NotTracked,
        }
    }

    /// Classify and act on one event. Returns the action taken.
    pub fn handle_event(&self, event: FsEvent) -> WatchAction {
        let action = self.classify(&event);

        match &action {
            WatchAction::Reconcile => {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                crate::log_event!("watchlist", "modified", "[{timestamp}] updating watchers");
                self.reconcile();
            }
            WatchAction::UpdateHeader { entry } => {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                crate::log_event!("watcher", "detected change", "[{timestamp}] {entry}");
                self.engine.update(Path::new(entry.as_str()));
                self.engine.refresh_manifest();
            }
            WatchAction::Ignore { reason } => {
                crate::debug_event!("watcher", "ignored", "{} ({reason})", event.path.display());
            }
        }

        action
    }

    /// Re-derive tracked files and watched directories from the watchlist.
    ///
    /// Entries removed from the watchlist keep their directory
    /// subscriptions and their headers.
    pub fn reconcile(&self) -> ReconcileReport {
        let current: IndexSet<WatchEntry> = self.engine.watchlist().load().into_iter().collect();

        let mut state = self.state.lock();
        let added: Vec<WatchEntry> = current.difference(&state.snapshot).cloned().collect();

        if !added.is_empty() {
            crate::log_event!("watchlist", "new files detected", "{}", added.len());
        }

        let required = DirectorySet::compute(&current);
        let new_directories = state.directories.merge(&required);
        self.subscribe_all(&state.directories);

        let mut updated = Vec::new();
        for entry in &added {
            crate::log_event!("watcher", "now watching", "{entry}");
            if entry.resolve(self.engine.root()).exists() {
                let outcome = self.engine.update(Path::new(entry.as_str()));
                updated.push((entry.clone(), outcome));
            }
        }

        state.snapshot = current;
        drop(state);

        self.engine.refresh_manifest();

        ReconcileReport {
            added,
            new_directories,
            updated,
        }
    }

    /// Subscribe to every directory in `dirs`. Failures are logged and
    /// retried on the next reconciliation.
    fn subscribe_all(&self, dirs: &DirectorySet) {
        for path in dirs.resolve(self.engine.root()) {
            match self.subscriber.subscribe(&path) {
                Ok(true) => {
                    crate::log_event!("watcher", "watching directory", "{}", path.display());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("[watcher] failed to watch {}: {e}", path.display());
                }
            }
        }
    }

    /// Directories watched so far.
    pub fn watched_directories(&self) -> DirectorySet {
        self.state.lock().directories.clone()
    }

    /// Watchlist entries as of the last reconciliation.
    pub fn tracked_entries(&self) -> Vec<WatchEntry> {
        self.state.lock().snapshot.iter().cloned().collect()
    }

    /// Drop all subscriptions; the event channel closes once the backend stops.
    pub fn shutdown(&self) {
        self.subscriber.unsubscribe_all();
        crate::debug_event!("watcher", "unsubscribed");
    }

    /// Feed notify events from `events` into the coordinator on a dedicated
    /// thread. The thread ends when the channel closes.
    pub fn spawn_dispatcher(
        self: &Arc<Self>,
        events: Receiver<notify::Result<notify::Event>>,
    ) -> std::io::Result<JoinHandle<()>> {
        let coordinator = Arc::clone(self);
        std::thread::Builder::new()
            .name("headwatch-events".to_string())
            .spawn(move || {
                for res in events.iter() {
                    match res {
                        Ok(event) => {
                            for fs_event in FsEvent::from_notify(event) {
                                coordinator.handle_event(fs_event);
                            }
                        }
                        Err(e) => {
                            tracing::error!("[watcher] file watch error: {e}");
                        }
                    }
                }
                crate::debug_event!("watcher", "event channel closed");
            })
    }
}
