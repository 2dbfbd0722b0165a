use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan or a resolver batch.
///
/// Walk errors inside a root are not represented here: an unreadable root
/// simply contributes no files.
#[derive(Debug, Error)]
pub enum DupeError {
    /// A file could not be opened or read while computing its fingerprint
    #[error("failed to fingerprint '{}': {source}", path.display())]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A duplicate could not be measured or removed
    #[error("failed to delete '{}': {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A duplicate could not be relocated into its quarantine folder
    #[error("failed to move '{}' to '{}': {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A quarantine folder could not be created
    #[error("failed to create quarantine folder '{}': {source}", path.display())]
    Quarantine {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An exclusion glob did not parse
    #[error("invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("no root directories to quarantine duplicates into")]
    NoRoots,

    #[error("scan worker terminated unexpectedly")]
    ScanWorker,
}

pub type Result<T> = std::result::Result<T, DupeError>;
