//! Merge command: sum several transition-count shards into one file.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use nmmc_io::{read_counts_file, write_counts_file};
use nmmc_markov::TransitionLog;

use crate::cli::MergeArgs;
use crate::config;
use crate::convert;

/// Run the shard merge.
pub fn run(args: MergeArgs) -> Result<()> {
    let _cmd = info_span!("merge").entered();
    let config = config::load(args.config.as_deref())?;
    let n_states = convert::resolve_n_states(&config.model, args.states)?;
    let reader_cfg = convert::build_reader_config(&config.codec)?;

    let mut merged = TransitionLog::new(n_states);
    for path in &args.counts {
        let shard = read_counts_file(path, &reader_cfg, n_states)
            .with_context(|| format!("failed to read counts: {}", path.display()))?;
        info!(path = %path.display(), rows = shard.len(), "shard loaded");
        merged
            .merge(shard)
            .with_context(|| format!("failed to merge shard: {}", path.display()))?;
    }

    write_counts_file(&args.output, &merged)
        .with_context(|| format!("failed to write counts: {}", args.output.display()))?;
    info!(
        shards = args.counts.len(),
        rows = merged.len(),
        transitions = merged.total_transitions(),
        "shards merged"
    );

    Ok(())
}
