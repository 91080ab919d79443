mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding `paths.input_dir`.
pub const INPUT_DIR_ENV: &str = "INPUT_DIR";
/// Environment variable overriding `paths.output_dir`.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./alacforge.toml",
        "~/.config/alacforge/config.toml",
        "/etc/alacforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

/// `INPUT_DIR` / `OUTPUT_DIR` take precedence over the file.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(dir) = env_path(INPUT_DIR_ENV) {
        config.paths.input_dir = dir;
    }
    if let Some(dir) = env_path(OUTPUT_DIR_ENV) {
        config.paths.output_dir = dir;
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(|v| PathBuf::from(shellexpand::tilde(&v.to_string_lossy()).as_ref()))
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.paths.input_dir.as_os_str().is_empty() {
        anyhow::bail!("paths.input_dir cannot be empty");
    }
    if config.paths.output_dir.as_os_str().is_empty() {
        anyhow::bail!("paths.output_dir cannot be empty");
    }

    if !config.paths.input_dir.exists() {
        tracing::warn!("Input directory does not exist: {:?}", config.paths.input_dir);
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
