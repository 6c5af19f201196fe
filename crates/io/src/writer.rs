//! CSV writers for transition matrices and transition logs.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use nmmc_markov::{TransitionLog, TransitionMatrix};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::IoError;
use crate::format::{push_fixed2, push_row};

/// Renders a matrix as CSV text.
///
/// One line per row, in the matrix's own (canonical) order:
/// `<key>,<p0>,...,<pN-1>\n`, every probability with exactly two decimals.
/// No header and no trailing blank line; an empty matrix renders as an empty
/// string.
pub fn render_matrix(matrix: &TransitionMatrix) -> String {
    let mut out = String::new();
    for (key, probs) in matrix.rows() {
        push_row(&mut out, key, probs.as_slice(), push_fixed2);
    }
    out
}

/// Renders a transition log as CSV text, rows in canonical key order.
pub fn render_counts(log: &TransitionLog) -> String {
    let mut out = String::new();
    for (key, counts) in log.sorted_entries() {
        push_row(&mut out, key, counts, |out, c| {
            let _ = write!(out, "{c}");
        });
    }
    out
}

/// Writes a matrix to `sink`.
///
/// The whole text is rendered first and handed to the sink in a single
/// `write_all`, followed by a flush.
///
/// # Errors
///
/// Returns [`IoError::IoFailure`] if the sink rejects the write or the flush.
pub fn write_matrix<W: Write>(matrix: &TransitionMatrix, mut sink: W) -> Result<(), IoError> {
    let text = render_matrix(matrix);
    sink.write_all(text.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Writes a transition log to `sink`.
///
/// # Errors
///
/// Returns [`IoError::IoFailure`] if the sink rejects the write or the flush.
pub fn write_counts<W: Write>(log: &TransitionLog, mut sink: W) -> Result<(), IoError> {
    let text = render_counts(log);
    sink.write_all(text.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Writes a matrix to `path`, replacing any existing file atomically.
///
/// # Errors
///
/// Returns [`IoError::IoFailure`] if the temporary file cannot be created,
/// written, or renamed over `path`. `path` is left untouched in that case.
pub fn write_matrix_file(path: &Path, matrix: &TransitionMatrix) -> Result<(), IoError> {
    persist_atomically(path, &render_matrix(matrix))?;
    info!(
        path = %path.display(),
        rows = matrix.len(),
        n_states = matrix.n_states(),
        "wrote transition matrix"
    );
    Ok(())
}

/// Writes a transition log to `path`, replacing any existing file atomically.
///
/// # Errors
///
/// Same as [`write_matrix_file`].
pub fn write_counts_file(path: &Path, log: &TransitionLog) -> Result<(), IoError> {
    persist_atomically(path, &render_counts(log))?;
    info!(path = %path.display(), rows = log.len(), "wrote transition log");
    Ok(())
}

/// Writes `contents` to a temporary file next to `path`, then renames it.
///
/// The temporary file is deleted when dropped, so every early return cleans up.
fn persist_atomically(path: &Path, contents: &str) -> Result<(), IoError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!(tmp = %tmp.path().display(), "staging output");
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| IoError::IoFailure { source: e.error })?;
    Ok(())
}
