use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Next-move Markov chain model tool.
#[derive(Parser)]
#[command(
    name = "nmmc",
    version,
    about = "Builds and inspects next-move Markov transition matrices"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Normalize a transition-count file into a transition matrix.
    Export(ExportArgs),
    /// Load a saved transition matrix and summarize its rows.
    Inspect(InspectArgs),
    /// Sum several transition-count files into one.
    Merge(MergeArgs),
}

/// Arguments for the `export` subcommand.
#[derive(clap::Args)]
pub struct ExportArgs {
    /// Path to the transition-count CSV file.
    #[arg(long)]
    pub counts: PathBuf,

    /// Path for the transition-matrix CSV output.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to TOML configuration file (defaults to ./nmmc.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of next-states from config.
    #[arg(short = 'n', long)]
    pub states: Option<usize>,
}

/// Arguments for the `inspect` subcommand.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the transition-matrix CSV file.
    #[arg(short, long)]
    pub matrix: PathBuf,

    /// Path to TOML configuration file (defaults to ./nmmc.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of next-states from config.
    #[arg(short = 'n', long)]
    pub states: Option<usize>,
}

/// Arguments for the `merge` subcommand.
#[derive(clap::Args)]
pub struct MergeArgs {
    /// Transition-count CSV shards to merge.
    #[arg(long, num_args = 1.., required = true)]
    pub counts: Vec<PathBuf>,

    /// Path for the merged transition-count CSV output.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to TOML configuration file (defaults to ./nmmc.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of next-states from config.
    #[arg(short = 'n', long)]
    pub states: Option<usize>,
}
