//! CLI end-to-end tests
//!
//! Runs the alacforge binary. Conversions use `true`/`false` in place of
//! ffmpeg so no real encoder is needed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the alacforge binary
#[allow(deprecated)]
fn alacforge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("alacforge").unwrap();
    cmd.env_remove("INPUT_DIR").env_remove("OUTPUT_DIR");
    cmd
}

/// Input tree plus a config file pointing `tools.ffmpeg_path` at `ffmpeg`.
fn workspace(ffmpeg: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(input.join("Album")).unwrap();
    fs::write(input.join("Album/01 Intro.flac"), b"fLaC").unwrap();
    fs::write(input.join("Album/02 Outro.flac"), b"fLaC").unwrap();

    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[paths]\ninput_dir = {:?}\noutput_dir = {:?}\n\n[tools]\nffmpeg_path = {:?}\n",
            input.display().to_string(),
            dir.path().join("output").display().to_string(),
            ffmpeg,
        ),
    )
    .unwrap();
    (dir, config)
}

fn config_arg(config: &Path) -> [String; 2] {
    ["--config".to_string(), config.display().to_string()]
}

#[test]
fn test_cli_no_args_shows_help() {
    alacforge_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    alacforge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("alacforge"))
        .stdout(predicate::str::contains("convert"));
}

#[test]
fn test_cli_version_command() {
    alacforge_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "alacforge {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_convert_requires_paths() {
    alacforge_cmd()
        .arg("convert")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PATHS"));
}

#[test]
fn test_cli_validate_config() {
    let (_dir, config) = workspace("ffmpeg");
    alacforge_cmd()
        .arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Input directory"));
}

#[test]
fn test_cli_validate_rejects_bad_port() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[server]\nport = 0\n").unwrap();

    alacforge_cmd()
        .arg("validate")
        .arg(&config)
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn test_cli_convert_succeeds() {
    let (_dir, config) = workspace("true");
    alacforge_cmd()
        .args(config_arg(&config))
        .args(["convert", "Album", "--sample-rate", "48000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Converting Album/01 Intro.flac → Album/01 Intro (48kHz).m4a",
        ))
        .stdout(predicate::str::contains("Converted: 2"))
        .stdout(predicate::str::contains("Failed: 0"));
}

#[cfg(unix)]
#[test]
fn test_cli_convert_reports_failures() {
    let (_dir, config) = workspace("false");
    alacforge_cmd()
        .args(config_arg(&config))
        .args(["convert", "Album/01 Intro.flac"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("exited with code 1"))
        .stdout(predicate::str::contains("Failed: 1"))
        .stdout(predicate::str::contains("Album/01 Intro.flac"));
}

#[cfg(unix)]
#[test]
fn test_cli_convert_skips_escaping_paths() {
    let (_dir, config) = workspace("true");
    alacforge_cmd()
        .args(config_arg(&config))
        .args(["convert", "../output", "Album/02 Outro.flac"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Skipping path outside input directory: ../output",
        ))
        .stdout(predicate::str::contains("Converted: 1"));
}

#[test]
fn test_cli_convert_rejects_out_of_range_sample_rate() {
    let (dir, config) = workspace("true");
    alacforge_cmd()
        .args(config_arg(&config))
        .args(["convert", "Album", "-r", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sample rate 500 Hz"));

    assert!(!dir.path().join("output").exists());
}
