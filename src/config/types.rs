use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the web UI (index.html, app.js); relative paths
    /// are taken from the working directory
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_STATIC_DIR))
}

/// Web UI shipped with the crate, relative to the working directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Sandbox root that selections are resolved against
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Root that converted files are written under
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("/data/input")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("/data/output")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg binary; `ffmpeg` on PATH when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn ffmpeg_program(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("ffmpeg"))
    }
}
