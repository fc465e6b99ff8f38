// ============================================================================
// ingesta-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// Only configuration-level failures surface as `CoreError` from the pipeline
// entry points. Per-file failures are caught where they happen and recorded
// as data (field errors, failed entries, proxy status) instead.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by the ingesta-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required external tool '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{tool} exited with {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{0} timed out after {1:?}")]
    CommandTimeout(String, Duration),

    #[error("Failed to copy '{}' to '{}': {error}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("Report writing failed: {0}")]
    Report(#[from] csv::Error),

    #[error("Workbook writing failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration file could not be parsed: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for ingesta-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds the error for a tool that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), error)
}

/// Builds the error for a tool that could not be waited on.
pub fn command_wait_error(tool: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), error)
}

/// Builds the error for a tool that ran but reported failure.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: impl fmt::Display,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        tool: tool.into(),
        status: status.to_string(),
        stderr: stderr.into(),
    }
}
