//! # alacforge-av
//!
//! External audio tooling for alacforge.
//!
//! This crate provides functionality for:
//! - Detecting external tools (ffmpeg) and their versions
//! - Transcoding a FLAC source into an ALAC-in-M4A destination via ffmpeg
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use alacforge_av::{FfmpegTranscoder, TranscodeRequest, Transcoder};
//!
//! # async fn example() -> alacforge_av::Result<()> {
//! let transcoder = FfmpegTranscoder::default();
//! let request = TranscodeRequest::new("/data/input/a.flac", "/data/output/a (48kHz).m4a")
//!     .with_sample_rate(Some(48000));
//! transcoder.transcode(&request).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod tools;
pub mod transcode;

// Re-exports
pub use error::{Error, Result};
pub use tools::{check_tool_with_arg, check_tools, require_tool, ToolInfo};
pub use transcode::{alac_args, FfmpegTranscoder, TranscodeRequest, Transcoder};
