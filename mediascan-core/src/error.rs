//! Error types for the mediascan-core library.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. Field-level
//! parse misses are never errors; only tool- and file-level failures end up
//! here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by mediascan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("Timed out reading {}", .0.display())]
    ToolTimeout(PathBuf),

    #[error("Tool reported an error: {0}")]
    ToolFailed(String),

    #[error("No 'Input #0' section in tool output for {}", .0.display())]
    MissingInputMarker(PathBuf),

    #[error("Unknown encoder: {0}")]
    UnknownEncoder(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for mediascan-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for the named command.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for the named command.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InputNotFound(PathBuf::from("/media/missing.mkv"));
        assert_eq!(err.to_string(), "Input file not found: /media/missing.mkv");

        let err = command_start_error("ffmpeg", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "Failed to start command 'ffmpeg': gone");

        let err = CoreError::ToolTimeout(PathBuf::from("/media/slow.ts"));
        assert_eq!(err.to_string(), "Timed out reading /media/slow.ts");
    }
}
