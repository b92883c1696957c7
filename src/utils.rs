//! Path helpers shared across modules.
//!
//! Every tracked path is compared as a root-relative string with `/`
//! separators, regardless of how the path reached us (watchlist line,
//! absolute notify path, CLI argument).

use std::path::{Component, Path};

/// Replace `\` with `/` and drop any leading `./` segments.
pub fn normalize_separators(raw: &str) -> String {
    let mut normalized = raw.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// Express `path` relative to `root` as a normalized string.
///
/// Relative inputs are taken as already relative to `root`. Absolute inputs
/// outside `root`, and any input with a `..` segment, yield `None`. When a plain prefix strip fails, the path is
/// canonicalized first, since notify may report paths through a different
/// symlink spelling than the one the root was opened with.
pub fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    if path.is_relative() {
        return components_to_string(path);
    }

    let stripped = match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => {
            let canonical = path.canonicalize().ok()?;
            canonical.strip_prefix(root).ok()?.to_path_buf()
        }
    };

    components_to_string(&stripped)
}

/// Join normal components with `/`, skipping `.` segments.
///
/// `None` for an empty path or one that climbs out with `..`.
fn components_to_string(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => return None,
            _ => {}
        }
    }
    let joined = normalize_separators(&parts.join("/"));
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_separators("src\\app.py"), "src/app.py");
        assert_eq!(normalize_separators("./src/app.py"), "src/app.py");
        assert_eq!(normalize_separators("././a"), "a");
        assert_eq!(normalize_separators("a/b"), "a/b");
    }

    #[test]
    fn test_relative_input_is_kept() {
        let root = PathBuf::from("/project");
        assert_eq!(
            relative_to_root(&root, Path::new("./src/app.py")),
            Some("src/app.py".to_string())
        );
    }

    #[test]
    fn test_absolute_input_is_stripped() {
        let root = PathBuf::from("/project");
        assert_eq!(
            relative_to_root(&root, Path::new("/project/src/app.py")),
            Some("src/app.py".to_string())
        );
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let root = PathBuf::from("/project");
        assert_eq!(relative_to_root(&root, Path::new("../x.py")), None);
        assert_eq!(relative_to_root(&root, Path::new("src/../../x.py")), None);
        assert_eq!(relative_to_root(&root, Path::new("/project/../x.py")), None);
    }

    #[test]
    fn test_outside_root_is_rejected() {
        let root = PathBuf::from("/project");
        assert_eq!(relative_to_root(&root, Path::new("/elsewhere/definitely-missing.py")), None);
        assert_eq!(relative_to_root(&root, Path::new("/project")), None);
    }
}
