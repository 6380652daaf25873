//! Global error handling for repotree
//!
//! Per-file read failures never surface here: the analyzer logs them and keeps
//! going. Only failures that abort a whole run are represented.

use std::io;
use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Global error type for repotree operations
#[derive(Error, Debug)]
pub enum RepoTreeError {
    /// The input contained no files or folders
    #[error("No files or folders selected")]
    EmptyInput,

    /// Tokenizer-related errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for repotree operations
pub type Result<T> = std::result::Result<T, RepoTreeError>;

/// Creates a RepoTreeError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::RepoTreeError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| RepoTreeError::Unexpected(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_threads(threads: usize) -> Result<usize> {
        ensure!(threads > 0, Config, "thread count must be positive, got {}", threads);
        Ok(threads)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(check_threads(2).unwrap(), 2);
        let err = check_threads(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: thread count must be positive, got 0"
        );
    }

    #[test]
    fn test_with_context() {
        let failed: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        let err = failed.with_context(|| "writing export").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected error: writing export: disk on fire");
    }

    #[test]
    fn test_empty_input_message() {
        assert_eq!(RepoTreeError::EmptyInput.to_string(), "No files or folders selected");
    }
}
