//! State keys labelling the rows of a transition log or matrix.

use std::borrow::Borrow;
use std::fmt;

use crate::error::MarkovError;

/// Separator between indices in a history-derived key.
pub const HISTORY_SEPARATOR: char = '-';

/// Identifier of a Markov state, typically a serialized history of prior
/// next-states.
///
/// Keys order lexicographically by their string bytes: `"10"` sorts before
/// `"2"`. This ordering is the canonical row order of every transition matrix.
///
/// A key never contains the CSV field separator `,` or a line break, so it can
/// be written as the first field of a row without quoting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(String);

impl StateKey {
    /// Creates a key, rejecting strings that cannot label a CSV row.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidKey`] if `key` is empty or contains `,`,
    /// `\r` or `\n`.
    pub fn new(key: impl Into<String>) -> Result<Self, MarkovError> {
        let key = key.into();
        if key.is_empty() {
            return Err(MarkovError::InvalidKey {
                key,
                reason: "key is empty".to_string(),
            });
        }
        if let Some(c) = key.chars().find(|c| matches!(c, ',' | '\r' | '\n')) {
            return Err(MarkovError::InvalidKey {
                reason: format!("contains {c:?}"),
                key,
            });
        }
        Ok(Self(key))
    }

    /// Serializes a history of prior next-state indices into a key.
    ///
    /// Indices are written in order, joined by [`HISTORY_SEPARATOR`]:
    /// `[3, 0]` becomes `"3-0"`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidKey`] if `history` is empty.
    pub fn from_history(history: &[usize]) -> Result<Self, MarkovError> {
        let key = history
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(&HISTORY_SEPARATOR.to_string());
        Self::new(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StateKey {
    type Error = MarkovError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for StateKey {
    type Error = MarkovError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
