//! CLI configuration.

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// External near-uniform sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampler {
    /// QuickSampler, with z3 validating its output.
    #[default]
    Quicksampler,
    /// UniGen.
    Unigen,
}

impl Sampler {
    /// Whether the sampler expects a `p cnf` header.
    pub fn needs_header(self) -> bool {
        matches!(self, Self::Unigen)
    }
}

/// CLI configuration, loaded from an optional JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// QuickSampler binary.
    pub quicksampler: PathBuf,
    /// z3 binary used to validate QuickSampler output.
    pub z3: PathBuf,
    /// UniGen binary.
    pub unigen: PathBuf,
    /// Sampler used when none is given on the command line.
    pub sampler: Sampler,
    /// Samples requested when none is given on the command line.
    pub num_samples: usize,
    /// Sampler timeout in seconds.
    pub timeout_secs: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            quicksampler: PathBuf::from("./samplers/quicksampler"),
            z3: PathBuf::from("./samplers/z3"),
            unigen: PathBuf::from("./samplers/unigen"),
            sampler: Sampler::default(),
            num_samples: 10_000,
            timeout_secs: 7200.0,
        }
    }
}

impl CliConfig {
    /// Loads configuration from file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: CliConfig =
            serde_json::from_str(r#"{ "unigen": "/opt/unigen", "sampler": "unigen" }"#).unwrap();
        assert_eq!(config.unigen, PathBuf::from("/opt/unigen"));
        assert_eq!(config.sampler, Sampler::Unigen);
        assert_eq!(config.num_samples, 10_000);
    }

    #[test]
    fn test_header_requirement() {
        assert!(Sampler::Unigen.needs_header());
        assert!(!Sampler::Quicksampler.needs_header());
    }
}
