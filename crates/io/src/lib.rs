//! # nmmc-io
//!
//! Flat-file interchange for transition models. Writes
//! [`TransitionMatrix`](nmmc_markov::TransitionMatrix) values as
//! `key,p0,...,pN-1` CSV lines with two-decimal probabilities, reads such
//! files back into keyed probability vectors, and stores raw
//! [`TransitionLog`](nmmc_markov::TransitionLog) counts in the same layout.
//!
//! Writing then reading a matrix is lossy: every probability comes
//! back within 0.005 of the original.

mod error;
mod format;
mod reader;
mod writer;

pub use error::IoError;
pub use format::read_back_tolerance;
pub use reader::{
    MalformedRowPolicy, ReaderConfig, read_counts, read_counts_file, read_matrix,
    read_matrix_file, read_transition_matrix,
};
pub use writer::{
    render_counts, render_matrix, write_counts, write_counts_file, write_matrix,
    write_matrix_file,
};
