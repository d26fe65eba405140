//! Path canonicalization and normalization for frame classification

use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a project root for prefix comparison
///
/// This function:
/// 1. Canonicalizes the path (resolves symlinks, `..`, `.`)
/// 2. Normalizes Unicode to NFC and separators to `/`
/// 3. Removes trailing slashes (except root)
///
/// A root that does not exist on disk is normalized as given.
pub fn canonicalize_root(path: &Path) -> PathBuf {
    let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    PathBuf::from(normalize_path_string(&canonical.to_string_lossy()))
}

/// Normalize a path string without touching the filesystem
///
/// Unicode is composed to NFC, `\` becomes `/`, and trailing separators are
/// removed (except for the root itself).
pub fn normalize_path_string(path: &str) -> String {
    let mut result: String = path.nfc().collect::<String>().replace('\\', "/");
    while result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}
