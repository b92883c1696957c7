//! ASCII rendering of the project directory tree.
//!
//! Produces the `├── ` / `└── ` listing embedded in the manifest header.
//! Unreadable directories render as empty rather than failing.

use std::fs;
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Renders a directory as an indented tree, skipping excluded names.
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    exclude: Vec<String>,
}

impl TreeRenderer {
    pub fn new(exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Render `root` as a multi-line string without a trailing newline.
    pub fn render(&self, root: &Path) -> String {
        self.render_lines(root).join("\n")
    }

    /// Render `root` as individual lines.
    pub fn render_lines(&self, root: &Path) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(root, "", &mut lines);
        lines
    }

    fn render_into(&self, dir: &Path, prefix: &str, lines: &mut Vec<String>) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            crate::debug_event!("tree", "unreadable", "{}", dir.display());
            return;
        };

        let mut entries: Vec<(String, bool)> = read_dir
            .filter_map(Result::ok)
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                // file_type() does not follow symlinks
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (name, is_dir)
            })
            .filter(|(name, _)| !self.is_excluded(name))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let count = entries.len();
        for (i, (name, is_dir)) in entries.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{prefix}{connector}{name}"));

            if is_dir {
                let extension = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                self.render_into(&dir.join(&name), &format!("{prefix}{extension}"), lines);
            }
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == name)
    }
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new([".git", "node_modules", "__pycache__"])
    }
}
