//! The header synchronization engine.
//!
//! Decides which files are managed, builds their headers and rewrites them
//! in place. Rewrites of the same path are limited by a coarse debounce
//! window, and all rewrites are serialized behind one lock.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use super::syntax::{SyntaxEntry, SyntaxTable};
use super::{apply_header, render_header, split_header};
use crate::config::Settings;
use crate::error::{HeaderError, SetupError};
use crate::tree::TreeRenderer;
use crate::utils::relative_to_root;
use crate::watcher::Debouncer;
use crate::watchlist::{WatchEntry, WatchlistStore};

const MANIFEST_TEMPLATE: &str =
    "# This file will be automatically updated with the project tree structure\n";

/// Result of a single [`HeaderEngine::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The header was written to disk.
    Written,
    /// The file already carried the current header; nothing was written.
    Unchanged,
    /// The path was rewritten too recently.
    Debounced,
    /// The path is not eligible for management.
    Skipped,
    /// Reading or writing failed; the file was left as it was.
    Failed,
}

/// Keeps managed headers in sync for the files listed in the watchlist.
pub struct HeaderEngine {
    root: PathBuf,
    watchlist: WatchlistStore,
    watchlist_name: String,
    manifest_name: String,
    /// Basenames never managed as ordinary files.
    reserved: Vec<String>,
    table: SyntaxTable,
    tree: TreeRenderer,
    /// Coarse per-path window between rewrites.
    rewrites: Debouncer,
    /// Serializes every read-modify-write across all paths.
    io_lock: Mutex<()>,
}

impl HeaderEngine {
    pub fn builder(root: impl Into<PathBuf>) -> HeaderEngineBuilder {
        HeaderEngineBuilder::new(root)
    }

    /// Build an engine for `root` using the names and windows in `settings`.
    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self::builder(root)
            .watchlist_name(&settings.watchlist)
            .manifest_name(&settings.manifest)
            .rewrite_window(settings.rewrite_window())
            .tree_exclude(settings.tree.exclude.clone())
            .build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn watchlist_name(&self) -> &str {
        &self.watchlist_name
    }

    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_name)
    }

    /// Root-relative, `/`-separated form of `path`.
    pub fn relative(&self, path: &Path) -> Option<String> {
        relative_to_root(&self.root, path)
    }

    /// Whether the basename of `rel_path` is one of the reserved names.
    pub fn is_reserved(&self, rel_path: &str) -> bool {
        let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
        self.reserved.iter().any(|name| name == basename)
    }

    /// Whether `path` is an ordinary managed file.
    ///
    /// False for reserved names, missing paths, paths not in the watchlist
    /// and unsupported extensions. The manifest is never an ordinary file.
    pub fn should_process(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|rel| self.should_process_relative(&rel))
    }

    fn should_process_relative(&self, rel: &str) -> bool {
        if self.is_reserved(rel) {
            return false;
        }
        if !self.root.join(rel).exists() {
            return false;
        }
        if !self.watchlist.contains(&WatchEntry::from(rel)) {
            return false;
        }
        self.table.supports(Path::new(rel))
    }

    fn is_manifest(&self, rel: &str) -> bool {
        rel == self.manifest_name
    }

    /// Comment syntax and header matcher for a relative path.
    pub fn syntax_for(&self, rel: &str) -> Option<&SyntaxEntry> {
        if self.is_manifest(rel) {
            Some(self.table.manifest())
        } else {
            self.table.for_path(Path::new(rel))
        }
    }

    /// Build the canonical header for `path`.
    ///
    /// Returns `None` for paths outside the root or with unsupported
    /// extensions. The manifest's tree is not included; see
    /// [`manifest_extra_lines`](Self::manifest_extra_lines).
    pub fn build_header(&self, path: &Path, extra_lines: &[String]) -> Option<String> {
        let rel = self.relative(path)?;
        let entry = self.syntax_for(&rel)?;
        Some(render_header(&entry.syntax, &rel, extra_lines))
    }

    /// Extra header lines carried by the manifest: a live project tree.
    pub fn manifest_extra_lines(&self) -> Vec<String> {
        let mut lines = vec!["Project Tree Structure:".to_string(), String::new()];
        lines.extend(self.tree.render_lines(&self.root));
        lines.push(String::new());
        lines
    }

    /// Return the body of `content` with any header for `path` removed.
    pub fn strip_header<'a>(&self, path: &Path, content: &'a str) -> &'a str {
        match self.relative(path).and_then(|rel| self.syntax_for(&rel)) {
            Some(entry) => split_header(entry, content).1,
            None => content,
        }
    }

    /// Bring the header of `path` up to date.
    ///
    /// Never fails: I/O and decode errors are logged and reported as
    /// [`UpdateOutcome::Failed`], leaving the file for the next event.
    pub fn update(&self, path: &Path) -> UpdateOutcome {
        let Some(rel) = self.relative(path) else {
            return UpdateOutcome::Skipped;
        };

        let is_manifest = self.is_manifest(&rel);
        if is_manifest {
            if !self.root.join(&rel).exists() {
                return UpdateOutcome::Skipped;
            }
        } else if !self.should_process_relative(&rel) {
            return UpdateOutcome::Skipped;
        }

        let Some(entry) = self.syntax_for(&rel) else {
            return UpdateOutcome::Skipped;
        };

        if !self.rewrites.is_settled(&rel) {
            crate::debug_event!("header", "debounced", "{rel}");
            return UpdateOutcome::Debounced;
        }

        let _guard = self.io_lock.lock();
        match self.rewrite(&rel, entry, is_manifest) {
            Ok(true) => {
                self.rewrites.touch(&rel);
                crate::log_event!("header", "updated", "{rel}");
                UpdateOutcome::Written
            }
            Ok(false) => {
                self.rewrites.touch(&rel);
                crate::debug_event!("header", "unchanged", "{rel}");
                UpdateOutcome::Unchanged
            }
            Err(e) => {
                tracing::error!("[header] error updating header in {rel}: {e}");
                UpdateOutcome::Failed
            }
        }
    }

    /// Regenerate the manifest header, if the manifest exists.
    pub fn refresh_manifest(&self) -> UpdateOutcome {
        let path = self.manifest_path();
        if !path.exists() {
            return UpdateOutcome::Skipped;
        }
        self.update(&path)
    }

    /// Create the manifest with its placeholder line if it is absent.
    ///
    /// Returns `true` when the file was created.
    pub fn ensure_manifest(&self) -> Result<bool, SetupError> {
        let path = self.manifest_path();
        if path.exists() {
            return Ok(false);
        }
        fs::write(&path, MANIFEST_TEMPLATE)
            .map_err(|source| SetupError::ManifestCreate { path, source })?;
        crate::log_event!("manifest", "created", "{}", self.manifest_name);
        Ok(true)
    }

    /// Read, re-header and write back one file. Caller holds `io_lock`.
    ///
    /// Returns whether the file changed on disk.
    fn rewrite(&self, rel: &str, entry: &SyntaxEntry, is_manifest: bool) -> Result<bool, HeaderError> {
        let path = self.root.join(rel);

        let bytes = fs::read(&path).map_err(|source| HeaderError::Read {
            path: path.clone(),
            source,
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| HeaderError::Decode { path: path.clone() })?;

        let extra_lines = if is_manifest {
            self.manifest_extra_lines()
        } else {
            Vec::new()
        };
        let header = render_header(&entry.syntax, rel, &extra_lines);
        let updated = apply_header(entry, &header, &content);

        if updated == content {
            return Ok(false);
        }

        write_atomic(&path, &updated)?;
        Ok(true)
    }
}

/// Write through a sibling temporary file renamed over `path`.
///
/// Symlinks are resolved first so the link stays in place and its target
/// is rewritten. The original file's permissions are carried over.
fn write_atomic(path: &Path, content: &str) -> Result<(), HeaderError> {
    let write_err = |source: std::io::Error| HeaderError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;

    if let Ok(metadata) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_err)?;
    }

    tmp.persist(&target).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Builder for constructing a [`HeaderEngine`].
pub struct HeaderEngineBuilder {
    root: PathBuf,
    watchlist_name: String,
    manifest_name: String,
    rewrite_window: Duration,
    tree_exclude: Option<Vec<String>>,
}

impl HeaderEngineBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            watchlist_name: crate::config::DEFAULT_WATCHLIST.to_string(),
            manifest_name: crate::config::DEFAULT_MANIFEST.to_string(),
            rewrite_window: Duration::from_millis(crate::config::MIN_REWRITE_MS),
            tree_exclude: None,
        }
    }

    pub fn watchlist_name(mut self, name: impl Into<String>) -> Self {
        self.watchlist_name = name.into();
        self
    }

    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Minimum interval between rewrites of the same path.
    pub fn rewrite_window(mut self, window: Duration) -> Self {
        self.rewrite_window = window;
        self
    }

    /// Directory names omitted from the manifest tree.
    pub fn tree_exclude(mut self, exclude: Vec<String>) -> Self {
        self.tree_exclude = Some(exclude);
        self
    }

    pub fn build(self) -> HeaderEngine {
        let reserved = vec![
            env!("CARGO_PKG_NAME").to_string(),
            self.watchlist_name.clone(),
            self.manifest_name.clone(),
        ];
        let tree = match self.tree_exclude {
            Some(exclude) => TreeRenderer::new(exclude),
            None => TreeRenderer::default(),
        };

        HeaderEngine {
            watchlist: WatchlistStore::new(self.root.join(&self.watchlist_name)),
            root: self.root,
            watchlist_name: self.watchlist_name,
            manifest_name: self.manifest_name,
            reserved,
            table: SyntaxTable::standard(),
            tree,
            rewrites: Debouncer::new(self.rewrite_window),
            io_lock: Mutex::new(()),
        }
    }
}
