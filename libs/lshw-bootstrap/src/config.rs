use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use lshw_core::InventoryConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment variables that override configuration values.
/// Nested keys are separated by `__`, e.g. `LSHW__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "LSHW__";

/// Host-level configuration: engine tunables, report shape and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub inventory: InventoryConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Category the report starts from.
    pub root: String,
    /// Whether nested categories are collected below the root.
    pub include_children: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            root: "system".to_owned(),
            include_children: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Layered load: built-in defaults, then the YAML file at `path` (if
    /// any), then `LSHW__*` environment variables.
    ///
    /// # Errors
    /// Returns an error if the file is missing or any layer fails to
    /// deserialize into the configuration types.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            anyhow::ensure!(path.is_file(), "config file not found: {}", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")?;

        tracing::debug!(
            from_file = path.is_some(),
            root = %config.report.root,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a YAML document layered over the defaults, without reading the
    /// environment.
    ///
    /// # Errors
    /// Returns an error if the document does not match the configuration
    /// types.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::string(yaml))
            .extract()
            .context("invalid configuration")
    }
}
