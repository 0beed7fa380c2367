use crate::core::pipeline::PipelineOptions;
use crate::core::scoring::ScoringConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

fn default_input() -> PathBuf {
    PathBuf::from("data/mutual_funds_raw.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_top_n() -> usize {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Raw fund table to analyze.
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Directory that receives the processed table, extracts and dashboard JSON.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            input: default_input(),
            output_dir: default_output_dir(),
            top_n: default_top_n(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or defaults if there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fundrank", "fundrank")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            scoring: self.scoring.clone(),
            top_n: self.top_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
input: "funds/raw.csv"
output_dir: "out"
top_n: 10
scoring:
  weights:
    return_3y: 0.5
    expense_ratio: 0.2
  rating_step: 0.01
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.input, PathBuf::from("funds/raw.csv"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.scoring.weights.return_3y, 0.5);
        assert_eq!(config.scoring.weights.expense_ratio, 0.2);
        // unspecified weights keep their defaults
        assert_eq!(config.scoring.weights.return_1y, 0.20);
        assert_eq!(config.scoring.rating_step, 0.01);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.pipeline_options().top_n, 30);
    }
}
