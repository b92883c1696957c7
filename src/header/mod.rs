//! Managed header blocks.
//!
//! A header block sits at offset 0 of a tracked file:
//!
//! ```text
//! <open>=== WATCHER HEADER START ===<close>
//! <open>File: <relative-path><close>
//! <open>Managed by file watcher<close>
//! [<open><extra line><close> ...]
//! <open>=== WATCHER HEADER END ===<close>
//! <blank line>
//! ```
//!
//! Its content depends only on the relative path, the comment syntax and
//! the optional extra lines, so rewriting is idempotent.

mod engine;
pub mod syntax;

pub use engine::{HeaderEngine, HeaderEngineBuilder, UpdateOutcome};
pub use syntax::{CommentSyntax, END_MARKER, START_MARKER, SyntaxEntry, SyntaxTable};

/// Build the header text for `rel_path`.
///
/// The result ends with the end-marker line followed by one blank line.
pub fn render_header(syntax: &CommentSyntax, rel_path: &str, extra_lines: &[String]) -> String {
    let mut lines = Vec::with_capacity(extra_lines.len() + 4);
    lines.push(syntax.wrap(START_MARKER));
    lines.push(syntax.wrap(&format!("File: {rel_path}")));
    lines.push(syntax.wrap("Managed by file watcher"));
    lines.extend(extra_lines.iter().map(|line| syntax.wrap(line)));
    lines.push(syntax.wrap(END_MARKER));

    let mut header = lines.join("\n");
    header.push_str("\n\n");
    header
}

/// Split `content` into its existing header block (possibly empty) and body.
pub fn split_header<'a>(entry: &SyntaxEntry, content: &'a str) -> (&'a str, &'a str) {
    match entry.pattern.find(content) {
        Some(m) => content.split_at(m.end()),
        None => ("", content),
    }
}

/// Line ending used by `content`: `"\r\n"` if its first line ends that way.
fn line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(i) if content[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Replace or prepend `header`, leaving exactly one trailing line ending.
///
/// `header` is written with `\n` line endings and converted to the ending
/// already used by `content`.
pub fn apply_header(entry: &SyntaxEntry, header: &str, content: &str) -> String {
    let (_, body) = split_header(entry, content);
    let eol = line_ending(content);

    let mut updated = String::with_capacity(header.len() + body.len() + 2);
    if eol == "\n" {
        updated.push_str(header);
    } else {
        updated.push_str(&header.replace('\n', eol));
    }
    updated.push_str(body);

    let trimmed = updated.trim_end_matches(['\r', '\n']).len();
    updated.truncate(trimmed);
    updated.push_str(eol);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn py() -> SyntaxEntry {
        SyntaxTable::standard().lookup(".py").cloned().unwrap()
    }

    #[test]
    fn test_render_header_python() {
        let header = render_header(&CommentSyntax::HASH, "src/app.py", &[]);
        assert_eq!(
            header,
            "# === WATCHER HEADER START ===\n\
             # File: src/app.py\n\
             # Managed by file watcher\n\
             # === WATCHER HEADER END ===\n\
             \n"
        );
    }

    #[test]
    fn test_render_header_with_extra_lines() {
        let extra = vec!["one".to_string(), String::new()];
        let header = render_header(&CommentSyntax::MARKUP, "README.md", &extra);
        let lines: Vec<&str> = header.lines().collect();
        assert_eq!(lines[3], "<!-- one -->");
        assert_eq!(lines[4], "<!--  -->");
        assert_eq!(lines[5], "<!-- === WATCHER HEADER END === -->");
        assert_eq!(lines[6], "");
    }

    #[test]
    fn test_apply_header_prepends() {
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let updated = apply_header(&py(), &header, "print(\"hi\")\n");
        assert_eq!(updated, format!("{header}print(\"hi\")\n"));
    }

    #[test]
    fn test_apply_header_is_idempotent() {
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let once = apply_header(&py(), &header, "x = 1\n\n\n");
        let twice = apply_header(&py(), &header, &once);
        assert_eq!(once, twice);
        assert!(once.ends_with("x = 1\n"));
    }

    #[test]
    fn test_body_is_preserved() {
        let body = "\n# not a header\nvalue = 2\n";
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let updated = apply_header(&py(), &header, body);

        let (found, rest) = split_header(&py(), &updated);
        assert_eq!(found, header);
        assert_eq!(rest, body);
    }

    #[test]
    fn test_longer_header_is_fully_replaced() {
        let long_extra: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        let long = render_header(&CommentSyntax::HASH, "a.py", &long_extra);
        let short = render_header(&CommentSyntax::HASH, "a.py", &["only".to_string()]);

        let first = apply_header(&py(), &long, "body\n");
        let second = apply_header(&py(), &short, &first);

        assert_eq!(second, format!("{short}body\n"));
        assert!(!second.contains("line 9"));
    }

    #[test]
    fn test_header_without_blank_separator_is_recognised() {
        let legacy = "# === WATCHER HEADER START ===\n\
                      # File: a.py\n\
                      # Managed by file watcher\n\
                      # === WATCHER HEADER END ===\n\
                      body\n";
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        assert_eq!(apply_header(&py(), &header, legacy), format!("{header}body\n"));
    }

    #[test]
    fn test_crlf_file_keeps_single_header() {
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let crlf_header = header.replace('\n', "\r\n");
        let content = format!("{crlf_header}x = 1\r\ny = 2\r\n");

        let updated = apply_header(&py(), &header, &content);
        assert_eq!(updated, content);
        assert_eq!(updated.matches("WATCHER HEADER START").count(), 1);
    }

    #[test]
    fn test_crlf_body_gets_crlf_header() {
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let updated = apply_header(&py(), &header, "x = 1\r\n\r\n");

        assert_eq!(updated, format!("{}x = 1\r\n", header.replace('\n', "\r\n")));
        assert!(!updated.replace("\r\n", "").contains('\n'));
        assert_eq!(apply_header(&py(), &header, &updated), updated);
    }

    #[test]
    fn test_empty_file() {
        let header = render_header(&CommentSyntax::HASH, "a.py", &[]);
        let once = apply_header(&py(), &header, "");
        assert!(once.ends_with("=== WATCHER HEADER END ===\n"));
        assert_eq!(apply_header(&py(), &header, &once), once);
    }
}
