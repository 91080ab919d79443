//! Directory listing for the file browser.
//!
//! Shows directories and FLAC files under the input directory, hiding dot
//! entries.

use alacforge_common::{
    paths::{is_flac_file, is_hidden},
    Error, Result, Sandbox,
};
use serde::{Deserialize, Serialize};

/// One visible entry of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    /// Path relative to the input directory, `/`-separated. Can be fed back
    /// into a listing or a conversion request.
    pub path: String,
    pub is_dir: bool,
}

/// List the directory at `relative` inside the sandbox, sorted by name.
///
/// # Errors
///
/// - [`Error::OutsideSandbox`] if `relative` escapes the input directory.
/// - [`Error::NotFound`] if it does not name an existing directory.
pub fn list_directory(sandbox: &Sandbox, relative: &str) -> Result<Vec<DirEntry>> {
    let dir = match sandbox.resolve(relative) {
        Ok(dir) if dir.is_dir() => dir,
        Ok(_) | Err(Error::NotFound(_)) => return Err(Error::not_found("Directory")),
        Err(e) => return Err(e),
    };

    let prefix = relative.trim_end_matches('/');
    let mut entries = Vec::new();

    for child in std::fs::read_dir(&dir)? {
        let child = child?;
        let Some(name) = child.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_hidden(&name) {
            continue;
        }

        let child_path = child.path();
        let is_dir = child_path.is_dir();
        if !is_dir && !is_flac_file(&child_path) {
            continue;
        }

        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        entries.push(DirEntry { name, path, is_dir });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_lists_dirs_and_flac_only() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Album")).unwrap();
        fs::create_dir_all(root.join(".hidden_dir")).unwrap();
        fs::write(root.join("b.flac"), b"").unwrap();
        fs::write(root.join("a.FLAC"), b"").unwrap();
        fs::write(root.join("c.mp3"), b"").unwrap();
        fs::write(root.join(".DS_Store"), b"").unwrap();
        fs::write(root.join("._b.flac"), b"").unwrap();

        let sandbox = Sandbox::new(root).unwrap();
        let entries = list_directory(&sandbox, "").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Album", "a.FLAC", "b.flac"]);
        assert!(entries[0].is_dir);
        assert!(!entries[1].is_dir);
        assert_eq!(entries[0].path, "Album");
    }

    #[test]
    fn test_nested_paths_keep_prefix() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Artist/Album")).unwrap();
        fs::write(dir.path().join("Artist/Album/01.flac"), b"").unwrap();

        let sandbox = Sandbox::new(dir.path()).unwrap();
        let entries = list_directory(&sandbox, "Artist/Album/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "Artist/Album/01.flac");
    }

    #[test]
    fn test_errors() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        fs::write(dir.path().join("input/a.flac"), b"").unwrap();
        let sandbox = Sandbox::new(dir.path().join("input")).unwrap();

        assert!(matches!(
            list_directory(&sandbox, "missing"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            list_directory(&sandbox, "a.flac"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            list_directory(&sandbox, ".."),
            Err(Error::OutsideSandbox(_))
        ));
    }
}
