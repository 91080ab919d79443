//! External tool detection.
//!
//! The converter shells out to ffmpeg. The program may be configured either
//! as a bare name looked up on `PATH` or as an explicit path.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool as configured.
    pub name: String,
    /// Whether the tool could be run.
    pub available: bool,
    /// Version reported by the tool, if it could be parsed.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available, passing `version_arg` to make it print its
/// version banner.
///
/// # Example
///
/// ```no_run
/// use alacforge_av::check_tool_with_arg;
///
/// let info = check_tool_with_arg("ffmpeg", "-version");
/// if info.available {
///     println!("ffmpeg {}", info.version.unwrap_or_default());
/// }
/// ```
pub fn check_tool_with_arg(program: &str, version_arg: &str) -> ToolInfo {
    let output = Command::new(program)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    let (available, version) = match output {
        Ok(output) if output.status.success() => {
            let banner = String::from_utf8_lossy(&output.stdout);
            (true, parse_version(banner.lines().next().unwrap_or_default()))
        }
        _ => (false, None),
    };

    ToolInfo {
        name: program.to_string(),
        available,
        version,
        path: if available { resolve_program(program).ok() } else { None },
    }
}

/// Check the tools the converter needs, given the configured ffmpeg program.
pub fn check_tools(ffmpeg: &str) -> Vec<ToolInfo> {
    vec![check_tool_with_arg(ffmpeg, "-version")]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the program is neither an existing path
/// nor found on `PATH`.
pub fn require_tool(program: &str) -> Result<PathBuf> {
    resolve_program(program)
}

fn resolve_program(program: &str) -> Result<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return if as_path.is_file() {
            Ok(as_path.to_path_buf())
        } else {
            Err(Error::tool_not_found(program))
        };
    }
    which::which(program).map_err(|_| Error::tool_not_found(program))
}

/// Pull the version token out of a banner such as
/// `ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 ...`.
fn parse_version(banner: &str) -> Option<String> {
    let mut words = banner.split_whitespace();
    while let Some(word) = words.next() {
        if word == "version" {
            return words.next().map(str::to_string);
        }
    }
    let trimmed = banner.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool_with_arg("nonexistent_tool_12345", "-version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_require_tool_not_found() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));

        let err = require_tool("/definitely/not/here/ffmpeg").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023").as_deref(),
            Some("6.1.1-3ubuntu5")
        );
        assert_eq!(parse_version("tool 1.0").as_deref(), Some("tool 1.0"));
        assert_eq!(parse_version("   "), None);
    }
}
