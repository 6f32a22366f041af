//! Error types for scanning and cleaning

use std::io;
use std::path::PathBuf;

/// Errors that stop an operation before it starts.
///
/// Transient I/O failures met during traversal or deletion are not
/// represented here; those go to the log sink and are tallied in reports.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Both start path and filter should be provided")]
    MissingInput,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot access '{}': No such file or directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error walking directory tree: {0}")]
    Walk(#[from] ignore::Error),
}

impl CleanError {
    /// Whether this error means the operation never started.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CleanError::Io { .. } | CleanError::Walk(_))
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;
