//! Run configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::categories::Category;
use crate::error::{ConfigError, DklError};

/// Mutual-information summary settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Display columns copied onto each summary row (e.g. metro title, state codes)
    pub passthrough_columns: Vec<String>,
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passthrough_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "passthrough_columns must not contain empty names".to_string(),
            ));
        }
        Ok(())
    }
}

/// Synthetic metro generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub metro_id: String,
    pub category: Category,
    pub n_counties: usize,
    pub blocks_per_county: usize,
    /// Expected persons per block
    pub mean_block_size: f64,
    /// 0 = every block mirrors the metro profile, 1 = fully concentrated blocks.
    /// Range: `[0.0, 1.0]`
    pub segregation: f64,
    /// Fixed seed for reproducible draws; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            metro_id: "99999".to_string(),
            category: Category::Income,
            n_counties: 3,
            blocks_per_county: 40,
            mean_block_size: 800.0,
            segregation: 0.5,
            seed: None,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metro_id.trim().is_empty() {
            return Err(ConfigError::Invalid("metro_id must not be empty".to_string()));
        }
        if self.n_counties == 0 || self.blocks_per_county == 0 {
            return Err(ConfigError::Invalid(format!(
                "need at least one county and one block per county, got {} x {}",
                self.n_counties, self.blocks_per_county
            )));
        }
        if !(self.mean_block_size.is_finite() && self.mean_block_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "mean_block_size must be > 0, got {}",
                self.mean_block_size
            )));
        }
        if !(0.0..=1.0).contains(&self.segregation) {
            return Err(ConfigError::Invalid(format!(
                "segregation must be in [0, 1], got {}",
                self.segregation
            )));
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub summary: SummaryConfig,
    pub synthetic: SyntheticConfig,
}

impl PipelineConfig {
    /// Load and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DklError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.summary.validate()?;
        self.synthetic.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_segregation_out_of_range() {
        let config = SyntheticConfig { segregation: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"summary": {{"passthrough_columns": ["metro_title", "state_codes"]}},
                "synthetic": {{"segregation": 0.9, "category": "race", "seed": 7}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.summary.passthrough_columns, vec!["metro_title", "state_codes"]);
        assert_eq!(config.synthetic.category, Category::Race);
        assert_eq!(config.synthetic.seed, Some(7));
        assert_eq!(config.synthetic.n_counties, SyntheticConfig::default().n_counties);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"summary": {{"passthrough_columns": [""]}}}}"#).unwrap();
        assert!(matches!(
            PipelineConfig::from_path(file.path()),
            Err(DklError::Config(ConfigError::Invalid(_)))
        ));
    }
}
