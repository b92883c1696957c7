//! Directory subscriptions with the platform notification backend.
//!
//! The coordinator only needs to ask for a directory to be watched; this
//! trait is that seam. [`NotifySubscriber`] is the real implementation and
//! tests substitute a recording fake.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, unbounded};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::error::WatchError;

/// Registers recursive directory subscriptions.
///
/// Subscribing to a directory twice must be harmless.
pub trait DirectorySubscriber: Send + Sync {
    /// Subscribe to `dir` recursively.
    ///
    /// Returns `Ok(true)` when a new registration was made and `Ok(false)`
    /// when the directory was already subscribed or does not exist yet.
    fn subscribe(&self, dir: &Path) -> Result<bool, WatchError>;

    /// Drop every subscription. Later `subscribe` calls fail.
    fn unsubscribe_all(&self);
}

struct Inner {
    watcher: Option<RecommendedWatcher>,
    subscribed: HashSet<PathBuf>,
}

/// `notify`-backed subscriber.
///
/// Events are forwarded into a crossbeam channel; dropping the watcher in
/// [`unsubscribe_all`](DirectorySubscriber::unsubscribe_all) closes it.
pub struct NotifySubscriber {
    inner: Mutex<Inner>,
}

impl NotifySubscriber {
    /// Create the watcher and the receiving end of its event channel.
    pub fn start() -> Result<(Self, Receiver<notify::Result<Event>>), WatchError> {
        let (tx, rx) = unbounded();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means we are shutting down.
            let _ = tx.send(res);
        })?;

        let subscriber = Self {
            inner: Mutex::new(Inner {
                watcher: Some(watcher),
                subscribed: HashSet::new(),
            }),
        };

        Ok((subscriber, rx))
    }

    /// Directories currently subscribed.
    pub fn subscribed(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.inner.lock().subscribed.iter().cloned().collect();
        dirs.sort();
        dirs
    }
}

impl DirectorySubscriber for NotifySubscriber {
    fn subscribe(&self, dir: &Path) -> Result<bool, WatchError> {
        let mut inner = self.inner.lock();
        let Inner {
            watcher,
            subscribed,
        } = &mut *inner;

        let Some(watcher) = watcher.as_mut() else {
            return Err(WatchError::ChannelClosed);
        };

        if subscribed.contains(dir) {
            return Ok(false);
        }

        if !dir.is_dir() {
            crate::debug_event!("watcher", "not yet present", "{}", dir.display());
            return Ok(false);
        }

        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        subscribed.insert(dir.to_path_buf());
        Ok(true)
    }

    fn unsubscribe_all(&self) {
        let mut inner = self.inner.lock();
        if let Some(mut watcher) = inner.watcher.take() {
            for dir in inner.subscribed.drain() {
                if let Err(e) = watcher.unwatch(&dir) {
                    crate::debug_event!("watcher", "unwatch failed", "{}: {e}", dir.display());
                }
            }
        }
    }
}
