//! TOML configuration loading and validation.

use std::path::Path;
use std::str::FromStr;

use allocbook::EngineConfig;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable actions table.
    #[default]
    Table,
    /// JSON array of per-asset records.
    Json,
    /// JSON response envelope with a status code.
    Envelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Load `path`, or fall back to defaults when it does not exist and
    /// was not asked for explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        self.level_filter()?;
        Ok(())
    }

    /// Parsed `logging.level`.
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.logging.level).map_err(|_| {
            Error::Config(format!("unknown log level '{}'", self.logging.level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[engine]
debug = true

[engine.tolerance]
weight_sum = 1e-9
mix_sum = 0.01
drift = 0.02

[output]
format = "json"

[logging]
level = "debug"
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert!(config.engine.debug);
        assert_eq!(config.engine.tolerance.drift, 0.02);
        assert_eq!(config.engine.tolerance.weight_sum, 1e-9);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(!config.engine.debug);
        assert_eq!(config.engine.tolerance.mix_sum, 0.01);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validate_catches_bad_tolerance() {
        let toml = example_toml().replace("drift = 0.02", "drift = -0.02");
        assert!(matches!(Config::from_toml(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn validate_catches_bad_level() {
        let toml = example_toml().replace("\"debug\"", "\"loud\"");
        assert!(matches!(Config::from_toml(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_format_is_parse_error() {
        let err = Config::from_toml("[output]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn missing_default_path_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::load_or_default(&path, false).is_ok());
        assert!(matches!(
            Config::load_or_default(&path, true),
            Err(Error::ConfigRead { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, example_toml()).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }
}
