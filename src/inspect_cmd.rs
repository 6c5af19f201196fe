//! Inspect command: load a saved matrix and print a per-row summary.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use nmmc_io::{IoError, read_transition_matrix};
use nmmc_markov::TransitionMatrix;

use crate::cli::InspectArgs;
use crate::config;
use crate::convert;

/// Run the inspection.
///
/// A missing matrix file is a cold start, not a failure.
pub fn run(args: InspectArgs) -> Result<()> {
    let _cmd = info_span!("inspect").entered();
    let config = config::load(args.config.as_deref())?;
    let n_states = convert::resolve_n_states(&config.model, args.states)?;
    let reader_cfg = convert::build_reader_config(&config.codec)?;

    let matrix = match read_transition_matrix(&args.matrix, &reader_cfg, n_states) {
        Ok(m) => m,
        Err(IoError::SourceNotFound { path }) => {
            info!(path = %path.display(), "no prior model");
            println!("no prior model at {}", path.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to load matrix: {}", args.matrix.display()));
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, &matrix).context("failed to write summary")?;
    Ok(())
}

/// Writes one line per row: key, most likely next-state and its probability.
///
/// Degenerate rows print `-` in place of a next-state.
fn write_summary<W: Write>(out: &mut W, matrix: &TransitionMatrix) -> std::io::Result<()> {
    writeln!(
        out,
        "{} rows, {} next-states, {} degenerate",
        matrix.len(),
        matrix.n_states(),
        matrix.degenerate_keys().len()
    )?;
    for (key, probs) in matrix.rows() {
        match most_likely(probs) {
            Some((to, p)) => writeln!(out, "{key}\t{to}\t{p:.2}")?,
            None => writeln!(out, "{key}\t-\t0.00")?,
        }
    }
    Ok(())
}

/// Index and value of the largest probability; `None` for an all-zero row.
/// Ties resolve to the lowest index.
fn most_likely(probs: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in probs.iter().enumerate() {
        if p > 0.0 && best.is_none_or(|(_, b)| p > b) {
            best = Some((i, p));
        }
    }
    best
}
