//! `apimodel.toml` configuration and process-wide `tracing` setup.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use apimodel_signature::FileFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

mod schema;

pub use schema::json_schema;

/// File names probed by [`discover_config_path`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["apimodel.toml", ".apimodel.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApiModelConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
    #[serde(default)]
    pub classpath: ClasspathConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When off, logs are filtered but discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

/// Signature file format used when writing, and assumed for files without a header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
    /// `2.0`, `3.0`, `4.0` or `5.0`.
    #[serde(default = "SignatureConfig::default_format")]
    pub format: String,
    /// Overrides the version default.
    #[serde(default)]
    pub kotlin_style_nulls: Option<bool>,
    /// Overrides the version default.
    #[serde(default)]
    pub include_type_use_annotations: Option<bool>,
    /// Overrides the version default.
    #[serde(default)]
    pub kotlin_name_type_order: Option<bool>,
}

impl SignatureConfig {
    fn default_format() -> String {
        "2.0".to_owned()
    }

    pub fn file_format(&self) -> Result<FileFormat, ConfigError> {
        let mut format = FileFormat::from_version_str(self.format.trim()).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "signature.format".to_owned(),
                message: format!("unsupported signature format `{}`", self.format),
            }
        })?;
        if let Some(value) = self.kotlin_style_nulls {
            format = format.with_kotlin_style_nulls(value);
        }
        if let Some(value) = self.include_type_use_annotations {
            format = format.with_include_type_use_annotations(value);
        }
        if let Some(value) = self.kotlin_name_type_order {
            format = format.with_kotlin_name_type_order(value);
        }
        Ok(format)
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            kotlin_style_nulls: None,
            include_type_use_annotations: None,
            kotlin_name_type_order: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClasspathConfig {
    /// JSON class stub indexes, relative to the config file.
    #[serde(default)]
    #[schemars(with = "Vec<String>")]
    pub indexes: Vec<PathBuf>,
}

impl ClasspathConfig {
    /// Index paths with relative entries joined onto `base_dir`.
    pub fn resolve_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.indexes
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base_dir.join(path)
                }
            })
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ApiModelConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Parses TOML text. The signature format is checked eagerly.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: ApiModelConfig = toml::from_str(text)?;
        config.signature.file_format()?;
        Ok(config)
    }
}

/// The first config file in `dir`, if any.
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

static TRACING_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs the global `tracing` subscriber described by `config`.
///
/// Only the first call in a process has an effect. Returns whether that call managed to
/// install the subscriber; it fails when another global subscriber was set first.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    *TRACING_INSTALLED.get_or_init(|| {
        let filter = config.env_filter();
        let writer = if config.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        };
        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        };
        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        let installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if installed {
            tracing::debug!(target: "apimodel.config", level = %config.level, json = config.json, "tracing initialised");
        }
        installed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_synonyms_are_normalized() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("apimodel.bridge=trace"),
            "apimodel.bridge=trace"
        );
    }

    #[test]
    fn defaults_describe_the_v2_format() {
        let config = ApiModelConfig::default();
        assert_eq!(config.signature.file_format().unwrap(), FileFormat::V2);
        assert!(config.logging.stderr);
        assert!(config.classpath.indexes.is_empty());
    }
}
