//! Export command: normalize a transition-count file into a matrix file.

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use nmmc_io::{read_counts_file, write_matrix_file};
use nmmc_markov::normalize;

use crate::cli::ExportArgs;
use crate::config;
use crate::convert;

/// Run the export pipeline.
pub fn run(args: ExportArgs) -> Result<()> {
    let _cmd = info_span!("export").entered();
    // 1. Load project TOML
    let config = config::load(args.config.as_deref())?;
    let markov_cfg = convert::build_markov_config(&config.model, args.states)?;
    let reader_cfg = convert::build_reader_config(&config.codec)?;

    // 2. Read transition counts
    let log = read_counts_file(&args.counts, &reader_cfg, markov_cfg.n_states())
        .with_context(|| format!("failed to read counts: {}", args.counts.display()))?;
    info!(
        rows = log.len(),
        transitions = log.total_transitions(),
        "transition log loaded"
    );

    // 3. Normalize
    let matrix = normalize(&log, &markov_cfg).context("normalization failed")?;
    if matrix.has_degenerate_rows() {
        warn!(
            n_degenerate = matrix.degenerate_keys().len(),
            "matrix contains all-zero rows"
        );
    }

    // 4. Write matrix
    write_matrix_file(&args.output, &matrix)
        .with_context(|| format!("failed to write matrix: {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        rows = matrix.len(),
        n_states = matrix.n_states(),
        "transition matrix exported"
    );

    Ok(())
}
