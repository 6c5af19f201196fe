//! Raw transition counts accumulated over a run.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::MarkovError;
use crate::state::StateKey;

/// Observed transition counts, keyed by the state the transitions leave from.
///
/// Each entry holds one count per possible next-state. The log is an owned
/// value: callers create it, feed it with [`record`](Self::record), and hand
/// it to [`normalize`](crate::normalize) once accumulation is over. Entries
/// have no meaningful order.
///
/// The log performs no locking. Parallel observers keep one log each and
/// [`merge`](Self::merge) the shards before normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionLog {
    n_states: usize,
    counts: HashMap<StateKey, Vec<u64>>,
}

impl TransitionLog {
    /// Creates an empty log for `n_states` possible next-states.
    pub fn new(n_states: usize) -> Self {
        Self {
            n_states,
            counts: HashMap::new(),
        }
    }

    /// Returns the number of possible next-states this log records.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Records one observed transition from `from` to next-state `to`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::StateOutOfRange`] if `to >= n_states`, or
    /// [`MarkovError::MalformedLog`] if `from` already holds a count vector of
    /// the wrong length (inserted through [`insert`](Self::insert)).
    pub fn record(&mut self, from: StateKey, to: usize) -> Result<(), MarkovError> {
        if to >= self.n_states {
            return Err(MarkovError::StateOutOfRange {
                state: to,
                n_states: self.n_states,
            });
        }
        if let Some(existing) = self.counts.get(from.as_str()) {
            if existing.len() != self.n_states {
                return Err(MarkovError::MalformedLog {
                    key: from.into_string(),
                    expected: self.n_states,
                    got: existing.len(),
                });
            }
        }
        let n_states = self.n_states;
        let counts = self
            .counts
            .entry(from)
            .or_insert_with(|| vec![0; n_states]);
        counts[to] = counts[to].saturating_add(1);
        Ok(())
    }

    /// Records a transition whose source state is the serialized `history`.
    ///
    /// See [`StateKey::from_history`] for the key format.
    pub fn record_history(&mut self, history: &[usize], to: usize) -> Result<(), MarkovError> {
        let from = StateKey::from_history(history)?;
        self.record(from, to)
    }

    /// Inserts an externally built count vector, replacing any previous entry.
    ///
    /// The length is not checked here; [`normalize`](crate::normalize)
    /// rejects vectors whose length differs from the configured state count.
    pub fn insert(&mut self, key: StateKey, counts: Vec<u64>) -> Option<Vec<u64>> {
        self.counts.insert(key, counts)
    }

    /// Returns the counts recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&[u64]> {
        self.counts.get(key).map(Vec::as_slice)
    }

    /// Number of distinct source states.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no state has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &[u64])> {
        self.counts.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Returns the entries sorted by key in canonical (lexicographic) order.
    pub fn sorted_entries(&self) -> Vec<(&StateKey, &[u64])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Total number of transitions recorded across all states.
    pub fn total_transitions(&self) -> u64 {
        self.counts
            .values()
            .flat_map(|v| v.iter())
            .fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Folds a shard into this log by summing counts element-wise.
    ///
    /// The merge is all-or-nothing: every entry of `other` is checked before
    /// any count is added.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::MalformedLog`] if any vector in `other`, or the
    /// matching vector in `self`, does not have `n_states` entries.
    pub fn merge(&mut self, other: TransitionLog) -> Result<(), MarkovError> {
        for (key, counts) in &other.counts {
            let own_len = self.counts.get(key).map_or(self.n_states, Vec::len);
            for got in [counts.len(), own_len] {
                if got != self.n_states {
                    return Err(MarkovError::MalformedLog {
                        key: key.to_string(),
                        expected: self.n_states,
                        got,
                    });
                }
            }
        }

        for (key, counts) in other.counts {
            match self.counts.entry(key) {
                Entry::Occupied(mut e) => {
                    for (dst, src) in e.get_mut().iter_mut().zip(counts) {
                        *dst = dst.saturating_add(src);
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(counts);
                }
            }
        }
        Ok(())
    }
}
