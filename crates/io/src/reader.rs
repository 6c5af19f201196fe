//! CSV readers for transition matrices and transition logs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use nmmc_markov::{StateKey, TransitionLog, TransitionMatrix};
use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::format::{SEPARATOR, read_back_tolerance};

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// What a reader does with a line it cannot parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedRowPolicy {
    /// Fail the whole read with [`IoError::MalformedRow`].
    #[default]
    Abort,
    /// Drop the line, log a warning, and keep reading.
    Skip,
}

/// Configuration for reading matrix and count files.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    on_malformed: MalformedRowPolicy,
}

impl ReaderConfig {
    /// Sets the malformed-row policy.
    pub fn with_malformed_row_policy(mut self, policy: MalformedRowPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Returns the malformed-row policy.
    pub fn malformed_row_policy(&self) -> MalformedRowPolicy {
        self.on_malformed
    }
}

// ---------------------------------------------------------------------------
// Matrix files
// ---------------------------------------------------------------------------

/// Reads transition-matrix rows from `source`.
///
/// Each line is split on `,`: the first field is the [`StateKey`], taken
/// verbatim; the remaining fields are parsed as `f64` in order. The vector
/// length is whatever the line holds. It is not compared against any
/// configured state count; see [`read_transition_matrix`] for that.
///
/// The returned map has no meaningful order. A key repeated on a later line
/// replaces the earlier row.
///
/// # Errors
///
/// - [`IoError::MalformedRow`] for a line that is not UTF-8, has an invalid
///   key or no values, or holds a field that is not a finite number, unless
///   the policy is [`MalformedRowPolicy::Skip`]. No partial map is returned.
/// - [`IoError::IoFailure`] if reading from `source` fails.
pub fn read_matrix<R: BufRead>(
    source: R,
    config: &ReaderConfig,
) -> Result<HashMap<StateKey, Vec<f64>>, IoError> {
    read_rows(source, config, parse_probability)
}

/// Reads transition-matrix rows from the file at `path`.
///
/// # Errors
///
/// Returns [`IoError::SourceNotFound`] if `path` does not exist, otherwise
/// the errors of [`read_matrix`].
pub fn read_matrix_file(
    path: &Path,
    config: &ReaderConfig,
) -> Result<HashMap<StateKey, Vec<f64>>, IoError> {
    let rows = read_matrix(open(path)?, config)?;
    info!(path = %path.display(), rows = rows.len(), "read transition matrix");
    Ok(rows)
}

/// Reads a matrix file and rebuilds it in canonical order.
///
/// Every row must hold exactly `n_states` probabilities, and every
/// non-zero row must sum to 1 within [`read_back_tolerance`].
///
/// # Errors
///
/// The errors of [`read_matrix_file`], plus [`IoError::Markov`] when a row
/// has the wrong length, a value outside `[0, 1]`, or a sum that rounding
/// alone can not explain.
pub fn read_transition_matrix(
    path: &Path,
    config: &ReaderConfig,
    n_states: usize,
) -> Result<TransitionMatrix, IoError> {
    let records = read_matrix_file(path, config)?;
    let matrix = TransitionMatrix::from_records(records, n_states)?;
    matrix.validate_with_tolerance(read_back_tolerance(n_states))?;
    Ok(matrix)
}

// ---------------------------------------------------------------------------
// Count files
// ---------------------------------------------------------------------------

/// Reads a transition log (`key,c0,...,cN-1` integer rows) from `source`.
///
/// Count vectors are kept at the length found on each line, so a short row
/// surfaces later as [`MarkovError::MalformedLog`](nmmc_markov::MarkovError)
/// from normalization.
///
/// # Errors
///
/// Same as [`read_matrix`], with fields parsed as non-negative integers.
pub fn read_counts<R: BufRead>(
    source: R,
    config: &ReaderConfig,
    n_states: usize,
) -> Result<TransitionLog, IoError> {
    let rows = read_rows(source, config, parse_count)?;
    let mut log = TransitionLog::new(n_states);
    for (key, counts) in rows {
        log.insert(key, counts);
    }
    Ok(log)
}

/// Reads a transition log from the file at `path`.
///
/// # Errors
///
/// Returns [`IoError::SourceNotFound`] if `path` does not exist, otherwise
/// the errors of [`read_counts`].
pub fn read_counts_file(
    path: &Path,
    config: &ReaderConfig,
    n_states: usize,
) -> Result<TransitionLog, IoError> {
    let log = read_counts(open(path)?, config, n_states)?;
    info!(path = %path.display(), rows = log.len(), "read transition log");
    Ok(log)
}

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<BufReader<File>, IoError> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(IoError::SourceNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn parse_probability(field: &str) -> Result<f64, String> {
    let value: f64 = field
        .parse()
        .map_err(|e| format!("{field:?} is not a number ({e})"))?;
    if !value.is_finite() {
        return Err(format!("{field:?} is not finite"));
    }
    Ok(value)
}

fn parse_count(field: &str) -> Result<u64, String> {
    field
        .parse()
        .map_err(|e| format!("{field:?} is not a count ({e})"))
}

/// Turns raw line bytes (without the `\n`) into text, dropping a trailing `\r`.
///
/// Bytes that are not UTF-8 are a property of the line, not of the source,
/// so they surface as [`IoError::MalformedRow`].
fn decode_line(mut bytes: Vec<u8>, line_no: usize) -> Result<String, IoError> {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| IoError::MalformedRow {
        line: line_no,
        reason: format!("invalid UTF-8 ({})", e.utf8_error()),
    })
}

/// Parses one `key,v0,...` line. `line_no` is 1-based.
fn parse_row<T>(
    line: &str,
    line_no: usize,
    parse_value: fn(&str) -> Result<T, String>,
) -> Result<(StateKey, Vec<T>), IoError> {
    let malformed = |reason: String| IoError::MalformedRow {
        line: line_no,
        reason,
    };

    let mut fields = line.split(SEPARATOR);
    let key = fields.next().unwrap_or_default();
    let key = StateKey::new(key).map_err(|e| malformed(e.to_string()))?;

    let values = fields
        .enumerate()
        .map(|(i, field)| {
            parse_value(field.trim_ascii())
                .map_err(|reason| malformed(format!("field {}: {reason}", i + 2)))
        })
        .collect::<Result<Vec<T>, IoError>>()?;
    if values.is_empty() {
        return Err(malformed(format!("key {:?} has no values", key.as_str())));
    }
    Ok((key, values))
}

fn read_rows<R: BufRead, T>(
    source: R,
    config: &ReaderConfig,
    parse_value: fn(&str) -> Result<T, String>,
) -> Result<HashMap<StateKey, Vec<T>>, IoError> {
    let mut rows = HashMap::new();
    let mut skipped = 0usize;

    for (i, bytes) in source.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_no = i + 1;
        let parsed =
            decode_line(bytes, line_no).and_then(|line| parse_row(&line, line_no, parse_value));
        match parsed {
            Ok((key, values)) => match rows.entry(key) {
                Entry::Occupied(mut e) => {
                    warn!(line = line_no, key = %e.key(), "duplicate key; keeping the later row");
                    e.insert(values);
                }
                Entry::Vacant(e) => {
                    e.insert(values);
                }
            },
            Err(err) => match config.malformed_row_policy() {
                MalformedRowPolicy::Abort => return Err(err),
                MalformedRowPolicy::Skip => {
                    warn!(error = %err, "skipping malformed row");
                    skipped += 1;
                }
            },
        }
    }

    debug!(rows = rows.len(), skipped, "parsed csv rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(
        text: &str,
        config: &ReaderConfig,
    ) -> Result<HashMap<StateKey, Vec<f64>>, IoError> {
        read_matrix(text.as_bytes(), config)
    }

    fn key(s: &str) -> StateKey {
        StateKey::new(s).unwrap()
    }

    #[test]
    fn reads_worked_example() {
        let rows = read_str("A,0.50,0.50\nB,0.00,1.00\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[&key("A")], vec![0.5, 0.5]);
        assert_eq!(rows[&key("B")], vec![0.0, 1.0]);
    }

    #[test]
    fn length_follows_line() {
        let rows = read_str("A,1.00\nB,0.25,0.25,0.50\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows[&key("A")].len(), 1);
        assert_eq!(rows[&key("B")].len(), 3);
    }

    #[test]
    fn key_taken_verbatim() {
        let rows = read_str(" A ,1.00\n", &ReaderConfig::default()).unwrap();
        assert!(rows.contains_key(" A "));
    }

    #[test]
    fn values_tolerate_whitespace_and_crlf() {
        let rows = read_str("A, 0.25 ,0.75\r\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows[&key("A")], vec![0.25, 0.75]);
    }

    #[test]
    fn missing_final_newline() {
        let rows = read_str("A,1.00", &ReaderConfig::default()).unwrap();
        assert_eq!(rows[&key("A")], vec![1.0]);
    }

    #[test]
    fn non_numeric_field_aborts() {
        let err = read_str("A,0.50,0.50\nB,0.00,abc\n", &ReaderConfig::default()).unwrap_err();
        assert!(
            matches!(err, IoError::MalformedRow { line: 2, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn key_without_values_aborts() {
        let err = read_str("A\n", &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn empty_key_and_blank_line_abort() {
        for text in [",0.5,0.5\n", "\n", "A,1.00\n\n"] {
            assert!(
                matches!(
                    read_str(text, &ReaderConfig::default()),
                    Err(IoError::MalformedRow { .. })
                ),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn trailing_separator_is_malformed() {
        let err = read_str("A,0.50,0.50,\n", &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn non_finite_is_malformed() {
        for text in ["A,NaN\n", "A,inf\n", "A,-infinity\n"] {
            assert!(
                matches!(
                    read_str(text, &ReaderConfig::default()),
                    Err(IoError::MalformedRow { .. })
                ),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn skip_policy_drops_bad_rows() {
        let config = ReaderConfig::default().with_malformed_row_policy(MalformedRowPolicy::Skip);
        let rows = read_str("A,0.50,0.50\nB,x,1.00\nC\nD,1.00,0.00\n", &config).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains_key("A"));
        assert!(rows.contains_key("D"));
        assert!(!rows.contains_key("B"));
    }

    #[test]
    fn invalid_utf8_is_malformed_row() {
        let text: &[u8] = b"A,0.50,0.50\nB\xff,0.00,1.00\nC,1.00,0.00\n";

        let err = read_matrix(text, &ReaderConfig::default()).unwrap_err();
        assert!(
            matches!(err, IoError::MalformedRow { line: 2, .. }),
            "got {err:?}"
        );

        let config = ReaderConfig::default().with_malformed_row_policy(MalformedRowPolicy::Skip);
        let rows = read_matrix(text, &config).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains_key("A"));
        assert!(rows.contains_key("C"));
    }

    #[test]
    fn crlf_before_invalid_line_keeps_line_numbers() {
        let text: &[u8] = b"A,1.00\r\n\xfe\r\nB,1.00\r\n";
        let err = read_matrix(text, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn duplicate_key_keeps_last() {
        let rows = read_str("A,1.00,0.00\nA,0.00,1.00\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[&key("A")], vec![0.0, 1.0]);
    }

    #[test]
    fn empty_source() {
        let rows = read_str("", &ReaderConfig::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn counts_parse_integers() {
        let log = read_counts("A,2,2\nB,0,4\n".as_bytes(), &ReaderConfig::default(), 2).unwrap();
        assert_eq!(log.get("A"), Some(&[2, 2][..]));
        assert_eq!(log.get("B"), Some(&[0, 4][..]));
    }

    #[test]
    fn counts_reject_fractions_and_negatives() {
        for text in ["A,1.5,2\n", "A,-1,2\n"] {
            assert!(
                matches!(
                    read_counts(text.as_bytes(), &ReaderConfig::default(), 2),
                    Err(IoError::MalformedRow { line: 1, .. })
                ),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn counts_keep_short_rows() {
        let log = read_counts("A,1\n".as_bytes(), &ReaderConfig::default(), 3).unwrap();
        assert_eq!(log.get("A"), Some(&[1][..]));
        assert_eq!(log.n_states(), 3);
    }

    #[test]
    fn reader_config_default() {
        assert_eq!(
            ReaderConfig::default().malformed_row_policy(),
            MalformedRowPolicy::Abort
        );
    }
}
