//! Transition logs and canonical transition matrices for n-th order Markov
//! chains.
//!
//! Observers accumulate raw transition counts into a [`TransitionLog`]; at
//! export time the log is normalized into a [`TransitionMatrix`] whose rows
//! are probability vectors in canonical (ascending lexicographic key) order.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//!  │    record     │────▶│   normalize    │────▶│ TransitionMatrix │
//!  │ (count moves) │     │ (sort, divide) │     │ (ordered rows)   │
//!  └──────────────┘     └────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use nmmc_markov::{MarkovConfig, StateKey, TransitionLog, normalize};
//!
//! let mut log = TransitionLog::new(2);
//! log.record(StateKey::new("A").unwrap(), 0).unwrap();
//! log.record(StateKey::new("A").unwrap(), 1).unwrap();
//!
//! let matrix = normalize(&log, &MarkovConfig::new(2)).unwrap();
//! assert_eq!(matrix.row("A"), Some(&[0.5, 0.5][..]));
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod state;
pub mod transition;

pub use config::{DegeneratePolicy, MarkovConfig};
pub use error::MarkovError;
pub use log::TransitionLog;
pub use state::{HISTORY_SEPARATOR, StateKey};
pub use transition::{TransitionMatrix, normalize};
