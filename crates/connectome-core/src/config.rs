use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable overriding [`OptimizerConfig::seed`].
pub const SEED_ENV: &str = "CONNECTOME_SEED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Which edge gets removed on every optimizer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Remove the edge with the highest edge betweenness.
    #[default]
    EdgeBetweenness,
    /// Remove the edge with the lowest path-sharing ratio.
    PathSharing,
    /// Remove the edge with the lowest weight.
    Weight,
}

/// Community quality score maximised by divisive clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreKind {
    #[default]
    Modularity,
    Chira,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub score: ScoreKind,
    /// Seed for tie-breaking among equally scoring edges.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Maximum number of removals in divisive mode. `None` means every edge.
    #[serde(default)]
    pub edge_limit: Option<usize>,
    /// Components with at most this many nodes are not counted.
    #[serde(default)]
    pub ignore_size: usize,
    /// Keep the per-step score and component series.
    #[serde(default)]
    pub record_trace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            score: ScoreKind::default(),
            seed: default_seed(),
            edge_limit: None,
            ignore_size: 0,
            record_trace: false,
        }
    }
}

const fn default_seed() -> u64 {
    0x5EED_C0DE
}

/// Load an analysis config from a TOML file. A missing file yields the
/// defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the config at `path` and apply environment overrides.
pub fn resolve_config(path: &Path) -> Result<AnalysisConfig> {
    let mut config = load_config(path)?;
    if let Some(seed) = resolve_seed(env::var(SEED_ENV).ok())? {
        config.optimizer.seed = seed;
    }
    Ok(config)
}

fn resolve_seed(raw: Option<String>) -> Result<Option<u64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let seed = trimmed
        .parse::<u64>()
        .with_context(|| format!("{SEED_ENV} must be an unsigned integer, got '{trimmed}'"))?;
    Ok(Some(seed))
}
