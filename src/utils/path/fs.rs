//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// The fallback matters for watcher events on paths that no longer exist
/// (a file replaced by rename), which cannot be canonicalized.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// File name for display, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.md");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.md");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("relative/path/file.md"));
    }

    #[test]
    fn test_normalize_path_resolves_dots() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.md");
        std::fs::write(&file, "x").unwrap();

        let dotted = dir.path().join(".").join("a.md");
        assert_eq!(normalize_path(&dotted), normalize_path(&file));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/docs/notes.md")), "notes.md");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
