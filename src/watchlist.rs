//! The watchlist: a plain-text list of tracked relative paths.
//!
//! One path per line. Blank lines and lines starting with `#` are ignored.
//! The file is re-read on every query so edits take effect immediately.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::normalize_separators;

const WATCHLIST_TEMPLATE: &str = "\
# List files to be watched (one per line)
# Lines starting with # are ignored
";

/// A tracked path, relative to the project root with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchEntry(String);

impl WatchEntry {
    pub fn new(raw: &str) -> Self {
        Self(normalize_separators(raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every ancestor directory of this entry, nearest first.
    ///
    /// `src/app/main.py` yields `src/app` then `src`. Root-level entries
    /// yield nothing.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        let path = self.0.as_str();
        path.char_indices()
            .rev()
            .filter(|&(_, c)| c == '/')
            .map(move |(i, _)| &path[..i])
            .filter(|dir| !dir.is_empty())
    }

    /// False when the entry climbs out of the root with a `..` segment.
    pub fn is_contained(&self) -> bool {
        !self.0.split('/').any(|segment| segment == "..")
    }

    /// Resolve against the project root.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WatchEntry {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Reads and bootstraps the watchlist file.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load entries in file order.
    ///
    /// A missing file yields an empty list. Read failures are logged and
    /// also yield an empty list.
    pub fn load(&self) -> Vec<WatchEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => parse(&content),
            Err(e) => {
                tracing::error!("[watchlist] error reading {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    /// Whether `entry` is currently listed.
    pub fn contains(&self, entry: &WatchEntry) -> bool {
        self.load().iter().any(|listed| listed == entry)
    }

    /// Create the watchlist with instructional comments if it is absent.
    ///
    /// Returns `true` when the file was created.
    pub fn ensure_exists(&self) -> std::io::Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        fs::write(&self.path, WATCHLIST_TEMPLATE)?;
        Ok(true)
    }

    /// Listed entries that do not exist under `root`.
    pub fn missing(&self, root: &Path) -> Vec<WatchEntry> {
        self.load()
            .into_iter()
            .filter(|entry| !entry.resolve(root).exists())
            .collect()
    }
}

fn parse(content: &str) -> Vec<WatchEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(WatchEntry::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let entries = parse("# header\n\nsrc/app.py\n   \n  lib\\util.js  \n#src/skip.py\n");
        let names: Vec<&str> = entries.iter().map(WatchEntry::as_str).collect();
        assert_eq!(names, vec!["src/app.py", "lib/util.js"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = WatchlistStore::new(temp.path().join("watchlist"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watchlist");
        fs::write(&path, "b.py\na.py\n./c/d.md\n").unwrap();

        let store = WatchlistStore::new(&path);
        let names: Vec<String> = store.load().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["b.py", "a.py", "c/d.md"]);
        assert!(store.contains(&WatchEntry::from("c/d.md")));
        assert!(!store.contains(&WatchEntry::from("d.md")));
    }

    #[test]
    fn test_ensure_exists_writes_template_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watchlist");
        let store = WatchlistStore::new(&path);

        assert!(store.ensure_exists().unwrap());
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.starts_with('#')));
        assert!(store.load().is_empty());

        fs::write(&path, "keep.py\n").unwrap();
        assert!(!store.ensure_exists().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep.py\n");
    }

    #[test]
    fn test_missing_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watchlist");
        fs::write(temp.path().join("here.py"), "").unwrap();
        fs::write(&path, "here.py\ngone.py\n").unwrap();

        let missing = WatchlistStore::new(&path).missing(temp.path());
        assert_eq!(missing, vec![WatchEntry::from("gone.py")]);
    }

    #[test]
    fn test_entry_ancestors() {
        let entry = WatchEntry::from("a/b/c.txt");
        let dirs: Vec<&str> = entry.ancestors().collect();
        assert_eq!(dirs, vec!["a/b", "a"]);
        assert_eq!(WatchEntry::from("top.txt").ancestors().count(), 0);
    }
}
