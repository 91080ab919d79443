//! Destination naming for converted tracks.
//!
//! A converted file keeps its directory structure and base name, gains the
//! target container extension, and carries a `(NNkHz)` annotation when it is
//! resampled. An existing trailing annotation is replaced rather than
//! stacked, so `Song (44kHz)` resampled to 48 kHz becomes `Song (48kHz)`.

use crate::paths::TARGET_EXTENSION;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static KHZ_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*kHz\)$").expect("static regex"));

/// Short label for a sample rate, e.g. `44100` -> `"44kHz"`.
pub fn sample_rate_label(sample_rate: u32) -> String {
    format!("{}kHz", sample_rate / 1000)
}

/// Compute the output file stem for a source stem and optional target rate.
pub fn output_stem(stem: &str, sample_rate: Option<u32>) -> String {
    let Some(rate) = sample_rate else {
        return stem.to_string();
    };

    let label = format!("({})", sample_rate_label(rate));
    if KHZ_SUFFIX.is_match(stem) {
        KHZ_SUFFIX.replace(stem, label.as_str()).into_owned()
    } else {
        format!("{stem} {label}")
    }
}

/// Derive the destination path (relative to the output root) for a source
/// path relative to the input root.
///
/// Pure: touches no filesystem state.
pub fn output_relative_path(source: &Path, sample_rate: Option<u32>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let file_name = format!(
        "{}.{}",
        output_stem(&stem, sample_rate),
        TARGET_EXTENSION
    );
    source.with_file_name(file_name)
}
