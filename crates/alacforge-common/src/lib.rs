//! Alacforge-Common: Shared types and utilities.
//!
//! This crate provides functionality used across alacforge:
//!
//! - **Error Handling**: Common error type and result alias
//! - **Path Utilities**: Source/target extension predicates and hidden-entry detection
//! - **Sandbox**: Containment of user-supplied relative paths under a fixed root
//! - **Naming**: Destination file names for converted tracks
//!
//! # Examples
//!
//! ```
//! use alacforge_common::naming::output_relative_path;
//! use alacforge_common::paths::is_flac_file;
//! use std::path::Path;
//!
//! assert!(is_flac_file(Path::new("album/01 Intro.FLAC")));
//!
//! let out = output_relative_path(Path::new("album/Song (44kHz).flac"), Some(48000));
//! assert_eq!(out, Path::new("album/Song (48kHz).m4a"));
//! ```

pub mod error;
pub mod naming;
pub mod paths;
pub mod sandbox;

pub use error::{Error, Result};
pub use sandbox::Sandbox;
