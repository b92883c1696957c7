//! Per-path debouncing windows.
//!
//! Two independent instances are used: a fine window that coalesces bursts
//! of raw notifications before classification, and a coarse window that
//! limits how often a single file's header is rewritten.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Remembers when each path last passed and rejects it until `window` elapses.
///
/// Safe to share across threads. Entries live for the process lifetime.
#[derive(Debug)]
pub struct Debouncer {
    /// path -> last accepted timestamp.
    last: DashMap<String, Instant>,
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            last: DashMap::new(),
            window,
        }
    }

    /// Create a debouncer with the given window in milliseconds.
    pub fn from_millis(window_ms: u64) -> Self {
        Self::new(Duration::from_millis(window_ms))
    }

    /// True when `key` has never been touched or its window has elapsed.
    pub fn is_settled(&self, key: &str) -> bool {
        match self.last.get(key) {
            Some(last) => last.elapsed() >= self.window,
            None => true,
        }
    }

    /// Record that `key` was accepted now.
    pub fn touch(&self, key: &str) {
        self.last.insert(key.to_string(), Instant::now());
    }

    /// Accept `key` if settled, recording the time; reject it otherwise.
    pub fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        match self.last.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if now.duration_since(*occupied.get()) < self.window {
                    return false;
                }
                occupied.insert(now);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
        }
    }

    /// Number of paths with a recorded timestamp.
    pub fn tracked_count(&self) -> usize {
        self.last.len()
    }
}
