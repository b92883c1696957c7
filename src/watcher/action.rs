//! Classification results for incoming events.

use std::fmt;

use crate::watchlist::WatchEntry;

/// What the coordinator decided to do with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// The watchlist itself changed; re-derive tracked files and directories.
    Reconcile,

    /// A tracked file changed; rewrite its header and refresh the manifest.
    UpdateHeader { entry: WatchEntry },

    /// Nothing to do.
    Ignore { reason: IgnoreReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Directory,
    Debounced,
    OutsideRoot,
    NotTracked,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IgnoreReason::Directory => "directory event",
            IgnoreReason::Debounced => "debounced",
            IgnoreReason::OutsideRoot => "outside project root",
            IgnoreReason::NotTracked => "not tracked",
        };
        f.write_str(text)
    }
}
