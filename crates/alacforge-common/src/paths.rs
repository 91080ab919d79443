//! Path utilities for detecting source and target files by extension.

use std::path::Path;

/// Extension of the accepted source format (FLAC).
pub const SOURCE_EXTENSION: &str = "flac";

/// Extension of the produced container (M4A holding ALAC).
pub const TARGET_EXTENSION: &str = "m4a";

/// Check if a path has the source (FLAC) extension, case-insensitively.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use alacforge_common::paths::is_flac_file;
///
/// assert!(is_flac_file(Path::new("track.flac")));
/// assert!(is_flac_file(Path::new("/music/Album/track.FLAC")));
/// assert!(!is_flac_file(Path::new("cover.jpg")));
/// ```
pub fn is_flac_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// Check if a directory entry name is hidden (starts with `.`).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
