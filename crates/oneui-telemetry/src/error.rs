//! Error types for crash log persistence

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the fallible building blocks of crash logging.
///
/// The public entry points never surface these; they log and swallow them.
#[derive(Debug, Error)]
pub enum CrashLogError {
    /// The log directory could not be created
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report file could not be written
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log directory could not be listed
    #[error("failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CrashLogError>;
