//! Error types for nmmc-io.

use std::path::PathBuf;

use nmmc_markov::MarkovError;

/// Error type for all fallible operations in the nmmc-io crate.
///
/// Each failure class is its own variant so callers can tell a cold start
/// ([`SourceNotFound`](Self::SourceNotFound)) from corrupt prior state
/// ([`MalformedRow`](Self::MalformedRow)) from an unusable sink
/// ([`IoFailure`](Self::IoFailure)).
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a source file does not exist on disk.
    #[error("source not found: {}", path.display())]
    SourceNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps a failure to open, read, write or rename a file or stream.
    #[error("i/o failure: {source}")]
    IoFailure {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Returned when a CSV line cannot be parsed.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number in the source.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Wraps a data-model violation detected while rebuilding a matrix.
    #[error("invalid model: {0}")]
    Markov(#[from] MarkovError),
}
