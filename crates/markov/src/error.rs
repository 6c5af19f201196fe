//! Error types for the nmmc-markov crate.

/// Error type for all fallible operations in the nmmc-markov crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkovError {
    /// Returned when the configured number of next-states is zero.
    #[error("invalid state count: {n} (must be at least 1)")]
    InvalidStateCount {
        /// The configured number of next-states.
        n: usize,
    },

    /// Returned when a state key cannot be used as a row label.
    #[error("invalid state key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a count vector in a transition log has the wrong length.
    #[error("malformed log: counts for {key:?} have {got} entries, expected {expected}")]
    MalformedLog {
        /// Key of the offending entry.
        key: String,
        /// Configured number of next-states.
        expected: usize,
        /// Length of the count vector found.
        got: usize,
    },

    /// Returned when a state has no outgoing transitions and the policy forbids zero rows.
    #[error("degenerate state {key:?}: no outgoing transitions observed")]
    DegenerateState {
        /// Key of the state whose counts sum to zero.
        key: String,
    },

    /// Returned when a recorded next-state index is outside `0..n_states`.
    #[error("next-state {state} out of range (n_states = {n_states})")]
    StateOutOfRange {
        /// The offending next-state index.
        state: usize,
        /// Number of next-states of the log.
        n_states: usize,
    },

    /// Returned when a probability row has a different length than the matrix.
    #[error("row {key:?} has {got} probabilities, expected {expected}")]
    RowLengthMismatch {
        /// Key of the offending row.
        key: String,
        /// Expected row length.
        expected: usize,
        /// Actual row length.
        got: usize,
    },

    /// Returned when a probability is non-finite or outside `[0, 1]`.
    #[error("row {key:?}, next-state {index}: invalid probability {value}")]
    InvalidProbability {
        /// Key of the offending row.
        key: String,
        /// Next-state index of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a non-degenerate row does not sum to 1.
    #[error("row {key:?} sums to {sum}, expected ~1.0")]
    NotStochastic {
        /// Key of the offending row.
        key: String,
        /// Actual row sum.
        sum: f64,
    },

    /// Returned when rows are not in strictly ascending key order.
    #[error("rows out of canonical order: {key:?} follows {previous:?}")]
    UnsortedRows {
        /// Key of the preceding row.
        previous: String,
        /// Key that breaks the ordering.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_state_count() {
        let e = MarkovError::InvalidStateCount { n: 0 };
        assert_eq!(e.to_string(), "invalid state count: 0 (must be at least 1)");
    }

    #[test]
    fn error_invalid_key() {
        let e = MarkovError::InvalidKey {
            key: "a,b".to_string(),
            reason: "contains ','".to_string(),
        };
        assert_eq!(e.to_string(), "invalid state key \"a,b\": contains ','");
    }

    #[test]
    fn error_malformed_log() {
        let e = MarkovError::MalformedLog {
            key: "0-1".to_string(),
            expected: 4,
            got: 3,
        };
        assert_eq!(
            e.to_string(),
            "malformed log: counts for \"0-1\" have 3 entries, expected 4"
        );
    }

    #[test]
    fn error_degenerate_state() {
        let e = MarkovError::DegenerateState {
            key: "B".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "degenerate state \"B\": no outgoing transitions observed"
        );
    }

    #[test]
    fn error_state_out_of_range() {
        let e = MarkovError::StateOutOfRange {
            state: 5,
            n_states: 3,
        };
        assert_eq!(e.to_string(), "next-state 5 out of range (n_states = 3)");
    }

    #[test]
    fn error_row_length_mismatch() {
        let e = MarkovError::RowLengthMismatch {
            key: "A".to_string(),
            expected: 2,
            got: 3,
        };
        assert_eq!(e.to_string(), "row \"A\" has 3 probabilities, expected 2");
    }

    #[test]
    fn error_invalid_probability() {
        let e = MarkovError::InvalidProbability {
            key: "A".to_string(),
            index: 1,
            value: 1.5,
        };
        assert_eq!(
            e.to_string(),
            "row \"A\", next-state 1: invalid probability 1.5"
        );
    }

    #[test]
    fn error_not_stochastic() {
        let e = MarkovError::NotStochastic {
            key: "A".to_string(),
            sum: 1.1,
        };
        assert_eq!(e.to_string(), "row \"A\" sums to 1.1, expected ~1.0");
    }

    #[test]
    fn error_unsorted_rows() {
        let e = MarkovError::UnsortedRows {
            previous: "B".to_string(),
            key: "A".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "rows out of canonical order: \"A\" follows \"B\""
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<MarkovError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<MarkovError>();
    }
}
