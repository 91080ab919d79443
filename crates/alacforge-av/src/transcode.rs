//! FLAC to ALAC transcoding through the ffmpeg CLI.
//!
//! The invocation contract is argv in, exit status out. ffmpeg's own output
//! streams are discarded; a zero exit status is success and anything else is
//! reported as [`Error::ToolExited`].

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Sample format forced on every output: 16-bit signed planar.
const SAMPLE_FORMAT: &str = "s16p";

/// Audio codec forced on every output.
const AUDIO_CODEC: &str = "alac";

/// Tool name used in errors, whatever binary the program path points at.
const TOOL_NAME: &str = "ffmpeg";

/// A single source -> destination conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    /// Absolute path of the FLAC source.
    pub source: PathBuf,
    /// Absolute path of the M4A destination.
    pub destination: PathBuf,
    /// Target sample rate in Hz; `None` keeps the source rate.
    pub sample_rate: Option<u32>,
}

impl TranscodeRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            sample_rate: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// Converts one file. Implementations must not panic on tool failure; every
/// failure is returned as an [`Error`].
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, request: &TranscodeRequest) -> Result<()>;
}

/// Build the ffmpeg argument list for an ALAC conversion.
///
/// Video streams (embedded cover art) are dropped, the sample format is
/// forced to 16-bit planar and the rate is only set when requested.
pub fn alac_args(request: &TranscodeRequest) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        request.source.to_string_lossy().into_owned(),
        "-vn".to_string(),
    ];
    if let Some(rate) = request.sample_rate {
        args.push("-ar".to_string());
        args.push(rate.to_string());
    }
    args.extend([
        "-sample_fmt".to_string(),
        SAMPLE_FORMAT.to_string(),
        "-c:a".to_string(),
        AUDIO_CODEC.to_string(),
        request.destination.to_string_lossy().into_owned(),
    ]);
    args
}

/// [`Transcoder`] backed by an ffmpeg subprocess.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTranscoder {
    /// Use `program` (a name on `PATH` or an explicit path) as ffmpeg.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        if let Some(parent) = request.destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = alac_args(request);

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {:?} {}", self.program, args.join(" "));

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                Error::tool_failed(TOOL_NAME, format!("failed to spawn {:?}: {e}", self.program))
            })?;

        if status.success() {
            Ok(())
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "{:?} failed for {:?} with status {}",
                self.program,
                request.source,
                status
            );
            Err(Error::tool_exited(TOOL_NAME, status.code()))
        }
    }
}
