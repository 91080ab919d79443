use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alacforge")]
#[command(author, version, about = "Batch FLAC to ALAC (M4A) converter")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server with web UI and conversion API
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert files or directories in the foreground and print the job log
    Convert {
        /// Paths relative to the input directory
        #[arg(required = true)]
        paths: Vec<String>,

        /// Resample to this rate in Hz (e.g. 44100, 48000)
        #[arg(short = 'r', long)]
        sample_rate: Option<u32>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
