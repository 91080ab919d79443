//! Containment of user-supplied paths under a fixed root directory.
//!
//! Every path handed in by a client is joined onto the root, canonicalised
//! (resolving `..` and symlinks) and then checked for component-wise ancestry
//! against the canonical root. A sibling directory that merely shares a
//! string prefix with the root (`/data/input2` next to `/data/input`) is
//! outside the sandbox.

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// A canonicalised root directory that relative paths are resolved against.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the root does not exist and
    /// [`Error::InvalidInput`] if it is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(format!("Directory {:?}", root)),
            _ => Error::Io(e),
        })?;
        if !canonical.is_dir() {
            return Err(Error::invalid_input(format!(
                "{:?} is not a directory",
                root
            )));
        }
        Ok(Self { root: canonical })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied relative path to a canonical absolute path
    /// inside the sandbox.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if nothing exists at the path.
    /// - [`Error::OutsideSandbox`] if the resolved path is not the root or a
    ///   descendant of it.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let joined = self.root.join(relative);
        let canonical = joined.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(format!("Path {relative:?}")),
            _ => Error::Io(e),
        })?;

        if !canonical.starts_with(&self.root) {
            return Err(Error::outside_sandbox(relative));
        }
        Ok(canonical)
    }

    /// Whether an absolute path lies inside the sandbox (structural check).
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Identifier of a user-supplied relative path as written, with `.` and
    /// `..` folded lexically and symlinks left unresolved. `None` if the
    /// lexical path leaves the root.
    ///
    /// Containment of the target still has to be checked with
    /// [`resolve`](Self::resolve) or [`contains`](Self::contains).
    pub fn lexical_id(&self, relative: &str) -> Option<String> {
        let mut normal = PathBuf::new();
        for component in self.root.join(relative).components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normal.pop() {
                        return None;
                    }
                }
                other => normal.push(other),
            }
        }
        self.relative_id(&normal)
    }

    /// Root-relative identifier of an absolute path inside the sandbox, with
    /// `/` separators. `None` if the path is outside the root or not UTF-8.
    pub fn relative_id(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                _ => return None,
            }
        }
        Some(parts.join("/"))
    }
}
