use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

use crate::analysis::Threshold;
use crate::error::AppError;
use crate::markers::DEFAULT_MARKER_PREFIX;

const ENV_PREFIX: &str = "STAGNATION";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub default_threshold: f64,
    pub marker_prefix: String,
    pub log_level: String,
    pub color_seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            default_threshold: 1.0,
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            log_level: "info".to_string(),
            color_seed: None,
        }
    }
}

impl Configuration {
    /// Layers defaults, the optional file at `path`, and `STAGNATION_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let configuration: Configuration = builder.build()?.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        let threshold = Threshold::new(self.default_threshold)
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;
        if !threshold.is_practical() {
            tracing::warn!(
                "Default threshold {} is outside the usual range of 0.01 to 10.0",
                self.default_threshold
            );
        }

        if self.marker_prefix.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "Marker prefix must not be empty".to_string(),
            ));
        }

        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, AppError> {
        Level::from_str(&self.log_level).map_err(|_| {
            AppError::InvalidConfig(format!("Unknown log level '{}'", self.log_level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::FileFormat;

    fn from_toml(contents: &str) -> Result<Configuration, AppError> {
        Configuration::from_builder(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
        )
    }

    #[test]
    fn defaults_match_the_threshold_control() {
        let configuration = Configuration::default();
        assert_eq!(configuration.default_threshold, 1.0);
        assert_eq!(configuration.marker_prefix, "Stagnant");
        assert_eq!(configuration.level().unwrap(), Level::INFO);
        assert!(configuration.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let configuration = from_toml(
            r#"
            default_threshold = 0.25
            marker_prefix = "Hold"
            color_seed = 17
            "#,
        )
        .unwrap();
        assert_eq!(configuration.default_threshold, 0.25);
        assert_eq!(configuration.marker_prefix, "Hold");
        assert_eq!(configuration.color_seed, Some(17));
        assert_eq!(configuration.log_level, "info");
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let err = from_toml("default_threshold = -2.0").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_blank_prefix_and_unknown_level() {
        assert!(from_toml("marker_prefix = \"  \"").is_err());
        assert!(from_toml("log_level = \"loud\"").is_err());
        assert_eq!(
            from_toml("log_level = \"debug\"").unwrap().level().unwrap(),
            Level::DEBUG
        );
    }
}
