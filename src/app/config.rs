use crate::domain::command::MediatorOptions;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn yes() -> bool {
    true
}

/// Runtime settings of a [`MatchEngine`](crate::app::engine::MatchEngine).
///
/// Every section is optional in the JSON file; missing keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub mediator: MediatorConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorConfig {
    #[serde(default = "yes")]
    pub auto_flush: bool,
    #[serde(default = "yes")]
    pub channel_enabled: bool,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            auto_flush: true,
            channel_enabled: true,
        }
    }
}

impl From<&MediatorConfig> for MediatorOptions {
    fn from(config: &MediatorConfig) -> Self {
        MediatorOptions {
            auto_flush: config.auto_flush,
            channel_enabled: config.channel_enabled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Walk through held signals instead of stopping at them.
    #[serde(default)]
    pub ignore_hold: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Cap on the number of matches returned by `match` queries.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl EngineConfig {
    /// Read the config at `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_sections_keep_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"scan": {"ignore_hold": true}}"#).unwrap();
        assert!(config.scan.ignore_hold);
        assert!(config.mediator.auto_flush);
        assert!(config.mediator.channel_enabled);
        assert_eq!(config.matching.max_results, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mediator": {{"auto_flush": false}}, "matching": {{"max_results": 3}}}}"#
        )
        .unwrap();
        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert!(!config.mediator.auto_flush);
        assert_eq!(config.matching.max_results, Some(3));

        let options = MediatorOptions::from(&config.mediator);
        assert!(!options.auto_flush && options.channel_enabled);
    }

    #[test]
    fn test_no_path_means_defaults() {
        assert_eq!(EngineConfig::load(None).unwrap(), EngineConfig::default());
    }
}
