//! Comment syntax per file extension.
//!
//! Each entry carries the open/close tokens used to wrap header lines and
//! the precompiled pattern that recognises an existing header block.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

pub const START_MARKER: &str = "=== WATCHER HEADER START ===";
pub const END_MARKER: &str = "=== WATCHER HEADER END ===";

/// Open/close token pair for one family of comment syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    pub open: &'static str,
    pub close: &'static str,
}

impl CommentSyntax {
    pub const HASH: CommentSyntax = CommentSyntax { open: "# ", close: "" };
    pub const SLASH: CommentSyntax = CommentSyntax { open: "// ", close: "" };
    pub const MARKUP: CommentSyntax = CommentSyntax { open: "<!-- ", close: " -->" };
    pub const BLOCK: CommentSyntax = CommentSyntax { open: "/* ", close: " */" };

    /// Wrap a single line in this syntax.
    pub fn wrap(&self, line: &str) -> String {
        format!("{}{line}{}", self.open, self.close)
    }

    /// Build the anchored header matcher for this syntax.
    ///
    /// Matches the start marker, any number of lines wrapped in the same
    /// tokens, the end marker, an optional newline and one optional blank
    /// separator line. Lines may end in `\n` or `\r\n`.
    fn header_pattern(&self) -> Regex {
        let open = regex::escape(self.open);
        let close = regex::escape(self.close);
        let start = regex::escape(START_MARKER);
        let end = regex::escape(END_MARKER);
        let pattern = format!(
            r"\A{open}{start}{close}\r?\n(?:{open}[^\r\n]*{close}\r?\n)*{open}{end}{close}(?:\r?\n(?:\r?\n)?)?"
        );
        Regex::new(&pattern).expect("header pattern is built from escaped literals")
    }
}

/// A syntax entry together with its compiled header matcher.
#[derive(Debug, Clone)]
pub struct SyntaxEntry {
    pub syntax: CommentSyntax,
    pub pattern: Regex,
}

impl SyntaxEntry {
    fn new(syntax: CommentSyntax) -> Self {
        let pattern = syntax.header_pattern();
        Self { syntax, pattern }
    }
}

/// Immutable mapping from lowercase extension to comment syntax.
///
/// Keys include the leading dot (`".py"`); the empty key covers files
/// without an extension. The manifest file has its own reserved entry that
/// is looked up by name rather than by extension.
#[derive(Debug, Clone)]
pub struct SyntaxTable {
    entries: HashMap<&'static str, SyntaxEntry>,
    manifest: SyntaxEntry,
}

impl SyntaxTable {
    /// The built-in table of recognised extensions.
    pub fn standard() -> Self {
        let mappings: [(&'static str, CommentSyntax); 12] = [
            (".py", CommentSyntax::HASH),
            (".txt", CommentSyntax::HASH),
            (".sh", CommentSyntax::HASH),
            ("", CommentSyntax::HASH),
            (".js", CommentSyntax::SLASH),
            (".java", CommentSyntax::SLASH),
            (".cpp", CommentSyntax::SLASH),
            (".c", CommentSyntax::SLASH),
            (".html", CommentSyntax::MARKUP),
            (".xml", CommentSyntax::MARKUP),
            (".md", CommentSyntax::MARKUP),
            (".css", CommentSyntax::BLOCK),
        ];

        let entries = mappings
            .into_iter()
            .map(|(ext, syntax)| (ext, SyntaxEntry::new(syntax)))
            .collect();

        Self {
            entries,
            manifest: SyntaxEntry::new(CommentSyntax::HASH),
        }
    }

    /// Look up an extension key such as `".py"` (case-insensitive).
    pub fn lookup(&self, extension: &str) -> Option<&SyntaxEntry> {
        self.entries.get(extension.to_lowercase().as_str())
    }

    /// Look up the entry for a path by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&SyntaxEntry> {
        self.lookup(&extension_key(path))
    }

    /// Entry reserved for the manifest file.
    pub fn manifest(&self) -> &SyntaxEntry {
        &self.manifest
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }
}

/// Extension with leading dot, or `""` when there is none.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
