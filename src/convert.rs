//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use crate::config::*;

use nmmc_io::{MalformedRowPolicy, ReaderConfig};
use nmmc_markov::{DegeneratePolicy, MarkovConfig};

/// Parses a degenerate-row policy name into the corresponding enum variant.
pub fn parse_degenerate_policy(s: &str) -> Result<DegeneratePolicy> {
    match s.to_lowercase().as_str() {
        "zero_row" | "zero-row" => Ok(DegeneratePolicy::ZeroRow),
        "error" => Ok(DegeneratePolicy::Error),
        other => bail!("unknown degenerate policy: {other:?}"),
    }
}

/// Parses a malformed-row policy name into the corresponding enum variant.
pub fn parse_malformed_row_policy(s: &str) -> Result<MalformedRowPolicy> {
    match s.to_lowercase().as_str() {
        "abort" => Ok(MalformedRowPolicy::Abort),
        "skip" => Ok(MalformedRowPolicy::Skip),
        other => bail!("unknown malformed-row policy: {other:?}"),
    }
}

/// Resolves the number of next-states: the CLI override wins over the TOML value.
pub fn resolve_n_states(model: &ModelToml, cli_override: Option<usize>) -> Result<usize> {
    cli_override
        .or(model.n_states)
        .context("number of states not set: use --states or set [model].n_states in config")
}

/// Builds a [`MarkovConfig`] from the TOML model configuration.
pub fn build_markov_config(model: &ModelToml, cli_states: Option<usize>) -> Result<MarkovConfig> {
    let n_states = resolve_n_states(model, cli_states)?;
    let policy = parse_degenerate_policy(&model.degenerate)?;
    let cfg = MarkovConfig::new(n_states).with_degenerate_policy(policy);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`ReaderConfig`] from the TOML codec configuration.
pub fn build_reader_config(codec: &CodecToml) -> Result<ReaderConfig> {
    let policy = parse_malformed_row_policy(&codec.on_malformed)?;
    Ok(ReaderConfig::default().with_malformed_row_policy(policy))
}
