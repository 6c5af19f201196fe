//! Configuration for transition-log normalization.

use crate::error::MarkovError;

/// How [`normalize`](crate::normalize) treats a state whose counts sum to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Emit an all-zero row and record the key as degenerate on the matrix.
    #[default]
    ZeroRow,
    /// Fail with [`MarkovError::DegenerateState`].
    Error,
}

/// Configuration for transition-log normalization.
///
/// # Example
///
/// ```
/// use nmmc_markov::{DegeneratePolicy, MarkovConfig};
///
/// let config = MarkovConfig::new(4).with_degenerate_policy(DegeneratePolicy::Error);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct MarkovConfig {
    n_states: usize,
    degenerate: DegeneratePolicy,
}

impl MarkovConfig {
    /// Creates a configuration for `n_states` possible next-states.
    ///
    /// Defaults: `degenerate = ZeroRow`.
    pub fn new(n_states: usize) -> Self {
        Self {
            n_states,
            degenerate: DegeneratePolicy::default(),
        }
    }

    /// Sets the degenerate-row policy.
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Returns the number of possible next-states (the row length N).
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Returns the degenerate-row policy.
    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidStateCount`] if `n_states` is zero.
    pub fn validate(&self) -> Result<(), MarkovError> {
        if self.n_states == 0 {
            return Err(MarkovError::InvalidStateCount { n: self.n_states });
        }
        Ok(())
    }
}
