use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "nmmc.toml";

/// Top-level nmmc configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NmmcConfig {
    /// Model settings.
    #[serde(default)]
    pub model: ModelToml,

    /// CSV codec settings.
    #[serde(default)]
    pub codec: CodecToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default)]
    pub n_states: Option<usize>,
    #[serde(default = "default_degenerate")]
    pub degenerate: String,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            n_states: None,
            degenerate: default_degenerate(),
        }
    }
}

fn default_degenerate() -> String {
    "zero_row".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecToml {
    #[serde(default = "default_on_malformed")]
    pub on_malformed: String,
}

impl Default for CodecToml {
    fn default() -> Self {
        Self {
            on_malformed: default_on_malformed(),
        }
    }
}

fn default_on_malformed() -> String {
    "abort".to_string()
}

/// Loads the configuration for a command.
///
/// An explicit `path` must exist. Without one, `nmmc.toml` in the working
/// directory is used if present, otherwise every setting takes its default.
pub fn load(path: Option<&Path>) -> Result<NmmcConfig> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !fallback.is_file() {
                debug!("no config file; using defaults");
                return Ok(NmmcConfig::default());
            }
            fallback
        }
    };

    let toml_str = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: NmmcConfig = toml::from_str(&toml_str)
        .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
    debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}
