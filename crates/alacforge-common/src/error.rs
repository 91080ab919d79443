//! Common error types used throughout alacforge.
//!
//! Covers the failure cases shared by the listing, resolution and status
//! paths: unknown entities, rejected input, sandbox escapes and I/O.

/// Common error type for alacforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The path resolves outside the sandbox root.
    #[error("Path escapes input directory: {0}")]
    OutsideSandbox(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a new OutsideSandbox error.
    pub fn outside_sandbox<S: Into<String>>(path: S) -> Self {
        Self::OutsideSandbox(path.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::OutsideSandbox(_) | Self::InvalidInput(_) => 400,
            Self::Io(_) | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
