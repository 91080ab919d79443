//! Alacforge - batch FLAC to ALAC conversion service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod browse;
pub mod config;
pub mod jobs;
pub mod server;
pub mod state;
