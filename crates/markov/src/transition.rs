//! Normalization of transition logs into canonical transition matrices.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{DegeneratePolicy, MarkovConfig};
use crate::error::MarkovError;
use crate::log::TransitionLog;
use crate::state::StateKey;

/// Tolerance on row sums accepted by [`TransitionMatrix::validate`].
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// A row-stochastic transition matrix with keyed rows.
///
/// Rows are held in canonical order: strictly ascending lexicographic
/// [`StateKey`]. Row `(key, probs)` gives the probability of moving from
/// `key` to each of the `n_states` next-states. Degenerate rows (states
/// observed with no outgoing transitions) are all-zero and listed in
/// [`degenerate_keys`](Self::degenerate_keys).
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    n_states: usize,
    rows: Vec<(StateKey, Vec<f64>)>,
    degenerate: Vec<StateKey>,
}

impl TransitionMatrix {
    /// Builds a matrix from rows already in canonical order.
    ///
    /// # Errors
    ///
    /// - [`MarkovError::InvalidStateCount`] if `n_states` is zero.
    /// - [`MarkovError::UnsortedRows`] if keys are not strictly ascending.
    /// - [`MarkovError::RowLengthMismatch`] if a row is not `n_states` long.
    /// - [`MarkovError::InvalidProbability`] if a value is non-finite or
    ///   outside `[0, 1]`.
    pub fn from_rows(
        rows: Vec<(StateKey, Vec<f64>)>,
        n_states: usize,
    ) -> Result<Self, MarkovError> {
        if n_states == 0 {
            return Err(MarkovError::InvalidStateCount { n: n_states });
        }
        for pair in rows.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(MarkovError::UnsortedRows {
                    previous: pair[0].0.to_string(),
                    key: pair[1].0.to_string(),
                });
            }
        }
        let mut degenerate = Vec::new();
        for (key, probs) in &rows {
            check_row(key, probs, n_states)?;
            if probs.iter().all(|&p| p == 0.0) {
                degenerate.push(key.clone());
            }
        }
        Ok(Self {
            n_states,
            rows,
            degenerate,
        })
    }

    /// Rebuilds a matrix from an unordered mapping, such as the rows read
    /// back from a CSV file.
    ///
    /// Keys are sorted into canonical order. Every vector must have
    /// `n_states` entries; this is where a caller rejects a file produced
    /// under a different state count.
    ///
    /// # Errors
    ///
    /// Same as [`from_rows`](Self::from_rows), except that ordering can not
    /// fail.
    pub fn from_records(
        records: HashMap<StateKey, Vec<f64>>,
        n_states: usize,
    ) -> Result<Self, MarkovError> {
        let mut rows: Vec<(StateKey, Vec<f64>)> = records.into_iter().collect();
        rows.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Self::from_rows(rows, n_states)
    }

    /// Number of possible next-states (the row length).
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns all rows in canonical order.
    pub fn rows(&self) -> &[(StateKey, Vec<f64>)] {
        &self.rows
    }

    /// Iterates over the row keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.rows.iter().map(|(k, _)| k)
    }

    /// Looks up the probability row of `key`.
    pub fn row(&self, key: &str) -> Option<&[f64]> {
        self.rows
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| self.rows[i].1.as_slice())
    }

    /// Returns the probability of moving from `key` to next-state `to`.
    pub fn prob(&self, key: &str, to: usize) -> Option<f64> {
        self.row(key).and_then(|r| r.get(to).copied())
    }

    /// Returns `true` if any row is degenerate (all zero).
    pub fn has_degenerate_rows(&self) -> bool {
        !self.degenerate.is_empty()
    }

    /// Keys of the degenerate rows, in canonical order.
    pub fn degenerate_keys(&self) -> &[StateKey] {
        &self.degenerate
    }

    /// Consumes the matrix, returning its rows.
    pub fn into_rows(self) -> Vec<(StateKey, Vec<f64>)> {
        self.rows
    }

    /// Validates that every non-degenerate row is stochastic.
    ///
    /// Checks that each such row sums to 1.0 within 1e-6, which holds for
    /// matrices built by [`normalize`]. Rows rounded to a few decimals (such
    /// as a matrix read back from CSV) drift further; check those with
    /// [`validate_with_tolerance`](Self::validate_with_tolerance).
    pub fn validate(&self) -> Result<(), MarkovError> {
        self.validate_with_tolerance(ROW_SUM_TOLERANCE)
    }

    /// Validates that every non-degenerate row sums to 1.0 within `tolerance`.
    ///
    /// A matrix whose values were each rounded to within `h` of the exact
    /// probability needs a tolerance of at least `n_states * h`.
    ///
    /// # Errors
    ///
    /// - [`MarkovError::RowLengthMismatch`] or
    ///   [`MarkovError::InvalidProbability`] for a malformed row.
    /// - [`MarkovError::NotStochastic`] for a row whose sum is off by more
    ///   than `tolerance`.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), MarkovError> {
        for (key, probs) in &self.rows {
            check_row(key, probs, self.n_states)?;
            let sum: f64 = probs.iter().sum();
            if sum != 0.0 && (sum - 1.0).abs() > tolerance {
                return Err(MarkovError::NotStochastic {
                    key: key.to_string(),
                    sum,
                });
            }
        }
        Ok(())
    }
}

fn check_row(key: &StateKey, probs: &[f64], n_states: usize) -> Result<(), MarkovError> {
    if probs.len() != n_states {
        return Err(MarkovError::RowLengthMismatch {
            key: key.to_string(),
            expected: n_states,
            got: probs.len(),
        });
    }
    for (index, &value) in probs.iter().enumerate() {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(MarkovError::InvalidProbability {
                key: key.to_string(),
                index,
                value,
            });
        }
    }
    Ok(())
}

/// Divides each count by the row total.
///
/// Returns `None` when the total is zero.
fn normalize_counts(counts: &[u64]) -> Option<Vec<f64>> {
    let row_sum: u128 = counts.iter().map(|&c| u128::from(c)).sum();
    if row_sum == 0 {
        return None;
    }
    let row_sum = row_sum as f64;
    Some(counts.iter().map(|&c| c as f64 / row_sum).collect())
}

/// Normalizes a transition log into a canonical transition matrix.
///
/// Keys are sorted in ascending lexicographic order (`"10"` before `"2"`) and
/// each count vector is divided by its total, so every non-degenerate row sums
/// to 1.0. A state whose counts sum to zero is handled according to
/// [`MarkovConfig::degenerate_policy`]: an all-zero row, or an error.
///
/// The log is only read. Normalizing the same log twice yields identical
/// matrices.
///
/// # Errors
///
/// - [`MarkovError::InvalidStateCount`] if the configuration is invalid.
/// - [`MarkovError::MalformedLog`] if any count vector does not have
///   `config.n_states()` entries.
/// - [`MarkovError::DegenerateState`] for an all-zero row under
///   [`DegeneratePolicy::Error`].
pub fn normalize(
    log: &TransitionLog,
    config: &MarkovConfig,
) -> Result<TransitionMatrix, MarkovError> {
    config.validate()?;
    let n_states = config.n_states();

    let entries = log.sorted_entries();

    // Reject the whole log before building anything.
    if let Some((key, counts)) = entries.iter().find(|(_, c)| c.len() != n_states) {
        return Err(MarkovError::MalformedLog {
            key: key.to_string(),
            expected: n_states,
            got: counts.len(),
        });
    }

    let mut rows = Vec::with_capacity(entries.len());
    let mut degenerate = Vec::new();
    for (key, counts) in entries {
        let probs = match normalize_counts(counts) {
            Some(probs) => probs,
            None => match config.degenerate_policy() {
                DegeneratePolicy::ZeroRow => {
                    warn!(key = %key, "state has no outgoing transitions; emitting zero row");
                    degenerate.push(key.clone());
                    vec![0.0; n_states]
                }
                DegeneratePolicy::Error => {
                    return Err(MarkovError::DegenerateState {
                        key: key.to_string(),
                    });
                }
            },
        };
        rows.push((key.clone(), probs));
    }

    debug!(
        rows = rows.len(),
        n_states,
        degenerate = degenerate.len(),
        "normalized transition log"
    );

    Ok(TransitionMatrix {
        n_states,
        rows,
        degenerate,
    })
}
