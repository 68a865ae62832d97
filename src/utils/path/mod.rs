//! Path utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `route_segments` - source file path → ordered route segments

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
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

/// Convert a source path relative to its root into route segments,
/// dropping the file extension.
///
/// # Example
/// ```ignore
/// assert_eq!(route_segments(Path::new("Blog/Id_.elm")), ["Blog", "Id_"]);
/// ```
pub fn route_segments(relative: &Path) -> Vec<String> {
    let stem = relative.with_extension("");
    stem.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Check whether a generated path segment is safe to join beneath a root.
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(&['/', '\\'][..])
}
