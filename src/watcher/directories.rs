//! The set of directories the watcher subscribes to.
//!
//! Derived from the watchlist: the project root plus every ancestor
//! directory of every entry. The set only grows; directories of entries
//! that leave the watchlist stay subscribed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::watchlist::WatchEntry;

/// Root-relative name used for the project root itself.
pub const ROOT_DIR: &str = ".";

/// Monotonic set of watched directories, stored root-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    dirs: BTreeSet<String>,
}

impl DirectorySet {
    /// A set holding only the project root.
    pub fn new() -> Self {
        Self {
            dirs: BTreeSet::from([ROOT_DIR.to_string()]),
        }
    }

    /// Compute the directories required by `entries`, root included.
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a WatchEntry>) -> Self {
        let mut set = Self::new();
        set.extend(entries);
        set
    }

    /// Add the ancestors of `entries`, returning directories not seen before.
    ///
    /// Entries reaching outside the root contribute nothing.
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = &'a WatchEntry>) -> Vec<String> {
        let mut added = Vec::new();
        for entry in entries.into_iter().filter(|entry| entry.is_contained()) {
            for dir in entry.ancestors() {
                if self.dirs.insert(dir.to_string()) {
                    added.push(dir.to_string());
                }
            }
        }
        added
    }

    /// Union with another set, returning directories not seen before.
    pub fn merge(&mut self, other: &DirectorySet) -> Vec<String> {
        other
            .dirs
            .iter()
            .filter(|dir| self.dirs.insert((*dir).clone()))
            .cloned()
            .collect()
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.dirs.contains(dir)
    }

    /// Root-relative directory names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    /// Absolute directory paths under `root`.
    pub fn resolve(&self, root: &Path) -> Vec<PathBuf> {
        self.iter()
            .map(|dir| {
                if dir == ROOT_DIR {
                    root.to_path_buf()
                } else {
                    root.join(dir)
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl Default for DirectorySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(paths: &[&str]) -> Vec<WatchEntry> {
        paths.iter().map(|p| WatchEntry::from(*p)).collect()
    }

    #[test]
    fn test_compute_includes_root_and_ancestors() {
        let list = entries(&["src/app/main.py", "src/lib.js", "README.md"]);
        let set = DirectorySet::compute(&list);

        let dirs: Vec<&str> = set.iter().collect();
        assert_eq!(dirs, vec![".", "src", "src/app"]);
    }

    #[test]
    fn test_extend_reports_only_new_directories() {
        let mut set = DirectorySet::compute(&entries(&["src/a.py"]));
        let added = set.extend(&entries(&["src/b.py", "docs/api/index.md"]));

        assert_eq!(added, vec!["docs/api".to_string(), "docs".to_string()]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_entries_outside_root_add_nothing() {
        let set = DirectorySet::compute(&entries(&["../up/x.py", "sub/../../y.py"]));
        let dirs: Vec<&str> = set.iter().collect();
        assert_eq!(dirs, vec!["."]);
    }

    #[test]
    fn test_merge_never_shrinks() {
        let mut watched = DirectorySet::compute(&entries(&["old/a.py", "keep/b.py"]));
        let current = DirectorySet::compute(&entries(&["keep/b.py"]));

        let added = watched.merge(&current);
        assert!(added.is_empty());
        assert!(watched.contains("old"));
        assert!(watched.contains("keep"));
    }

    #[test]
    fn test_resolve() {
        let set = DirectorySet::compute(&entries(&["src/a.py"]));
        let root = Path::new("/project");
        assert_eq!(
            set.resolve(root),
            vec![PathBuf::from("/project"), PathBuf::from("/project/src")]
        );
    }
}
