//! Error types for limcheck

use thiserror::Error;

/// limcheck error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("C compiler not found: {command}")]
    CompilerNotFound { command: String },

    #[error("Compiler invocation failed ({status}): {command}\n{stderr}")]
    CompilerInvocation {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid macro name: {0:?}")]
    InvalidName(String),

    #[error("Invalid macro pattern: {0}")]
    InvalidPattern(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error comes from running the compiler rather than from its output
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            Error::CompilerNotFound { .. } | Error::CompilerInvocation { .. } | Error::Io(_)
        )
    }
}

/// Result type alias for limcheck
pub type Result<T> = std::result::Result<T, Error>;
