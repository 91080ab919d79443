//! Expansion of user selections into a concrete set of FLAC files.

use alacforge_common::{paths::is_flac_file, Error, Sandbox};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Why a selected path contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipNotice {
    /// Missing, unreadable, or not a FLAC file or directory.
    Invalid(String),
    /// Resolves outside the input directory.
    OutsideSandbox(String),
}

impl fmt::Display for SkipNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipNotice::Invalid(path) => write!(f, "Skipping invalid path: {path}"),
            SkipNotice::OutsideSandbox(path) => {
                write!(f, "Skipping path outside input directory: {path}")
            }
        }
    }
}

/// Outcome of resolving a selection.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Root-relative identifiers (`/`-separated), deduplicated and sorted.
    pub files: BTreeSet<String>,
    /// One notice per selected path that was excluded, in selection order.
    pub skipped: Vec<SkipNotice>,
}

/// Resolve `paths` (relative to the sandbox root) into FLAC file identifiers.
///
/// Directories are walked recursively, following symlinks; files are
/// accepted when their extension is `flac` in any case. Identifiers keep the
/// names the user sees (a linked file is listed under its link name), while
/// containment is checked against the link target. Nothing here fails: bad
/// entries become [`SkipNotice`]s.
pub fn resolve_paths(sandbox: &Sandbox, paths: &[String]) -> Resolution {
    let mut resolution = Resolution::default();

    for rel in paths {
        let target = match sandbox.resolve(rel) {
            Ok(path) => path,
            Err(Error::OutsideSandbox(_)) => {
                warn!("Rejected path outside input directory: {}", rel);
                resolution
                    .skipped
                    .push(SkipNotice::OutsideSandbox(rel.clone()));
                continue;
            }
            Err(e) => {
                debug!("Cannot resolve {:?}: {}", rel, e);
                resolution.skipped.push(SkipNotice::Invalid(rel.clone()));
                continue;
            }
        };

        let id = sandbox
            .lexical_id(rel)
            .or_else(|| sandbox.relative_id(&target));
        let Some(id) = id else {
            resolution.skipped.push(SkipNotice::Invalid(rel.clone()));
            continue;
        };

        if target.is_dir() {
            collect_directory(sandbox, &id, &mut resolution);
        } else if target.is_file() && is_flac_file(Path::new(&id)) {
            resolution.files.insert(id);
        } else {
            resolution.skipped.push(SkipNotice::Invalid(rel.clone()));
        }
    }

    resolution
}

fn collect_directory(sandbox: &Sandbox, dir_id: &str, resolution: &mut Resolution) {
    let dir = if dir_id.is_empty() {
        sandbox.root().to_path_buf()
    } else {
        sandbox.root().join(dir_id)
    };

    for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error walking {:?}: {}", dir, e);
                if let Some(id) = e.path().and_then(|p| sandbox.relative_id(p)) {
                    resolution.skipped.push(SkipNotice::Invalid(id));
                }
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_flac_file(entry.path()) {
            continue;
        }

        let Some(id) = sandbox.relative_id(entry.path()) else {
            warn!("Ignoring non UTF-8 file name: {:?}", entry.path());
            continue;
        };

        // Any link on the way may point out of the root.
        let inside = entry
            .path()
            .canonicalize()
            .map(|target| sandbox.contains(&target))
            .unwrap_or(false);
        if !inside {
            warn!("Rejected link pointing outside input directory: {}", id);
            resolution.skipped.push(SkipNotice::OutsideSandbox(id));
            continue;
        }

        resolution.files.insert(id);
    }
}
