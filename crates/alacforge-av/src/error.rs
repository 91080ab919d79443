//! Error types for alacforge-av.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while invoking external tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool could not be run.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool ran and exited unsuccessfully.
    #[error("{tool} exited with code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "unknown (terminated by signal)".to_string()))]
    ToolExited { tool: String, code: Option<i32> },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a tool exit status error.
    pub fn tool_exited(tool: impl Into<String>, code: Option<i32>) -> Self {
        Self::ToolExited {
            tool: tool.into(),
            code,
        }
    }
}
