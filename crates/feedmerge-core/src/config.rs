//! Configuration loading and typed config structures for feedmerge.
//!
//! Configuration lives in an optional YAML file (conventionally
//! `feedmerge.yaml`). Every field has a default, so an empty file -- or no
//! file at all -- yields a working setup. A handful of environment variables
//! override the file after it is parsed:
//!
//! - `FEEDMERGE_ENVELOPE_FIELD` overrides `merge.envelope_field`
//! - `FEEDMERGE_LOG_LEVEL` overrides `logging.level`

use std::path::Path;

use feedmerge_types::DEFAULT_ID_FIELD;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level feedmerge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MergeConfig {
    /// How snapshots are unwrapped and keyed.
    #[serde(default)]
    pub merge: MergeSettings,

    /// How duplicate records are compared.
    #[serde(default)]
    pub equality: EqualityConfig,

    /// How directory inputs are expanded into sources.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MergeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("FEEDMERGE_ENVELOPE_FIELD") {
            self.merge.envelope_field = val;
        }
        if let Some(val) = lookup("FEEDMERGE_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Check values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge.envelope_field.is_empty() {
            return Err(invalid("merge.envelope_field must not be empty"));
        }
        if self.merge.id_field.is_empty() {
            return Err(invalid("merge.id_field must not be empty"));
        }
        if self.equality.ignore_fields.contains(&self.merge.id_field) {
            return Err(invalid(format!(
                "equality.ignore_fields must not contain the id field `{}`",
                self.merge.id_field
            )));
        }
        if self.sources.extension.starts_with('.') {
            return Err(invalid("sources.extension is given without the leading dot"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// Snapshot layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeSettings {
    /// Field under which envelope-shaped snapshots keep their records.
    #[serde(default = "default_envelope_field")]
    pub envelope_field: String,

    /// Field that carries each record's identity.
    #[serde(default = "default_id_field")]
    pub id_field: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            envelope_field: default_envelope_field(),
            id_field: default_id_field(),
        }
    }
}

/// Record comparison settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EqualityConfig {
    /// Which equality predicate decides whether a duplicate is a conflict.
    #[serde(default)]
    pub mode: EqualityMode,

    /// Top-level fields left out of the comparison.
    #[serde(default)]
    pub ignore_fields: Vec<String>,
}

/// Equality predicates selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMode {
    /// Exact JSON value equality.
    #[default]
    Structural,
    /// JSON equality with numbers compared by value.
    Numeric,
}

/// Source discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourcesConfig {
    /// File extension picked up when an input is a directory.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format of log lines.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

fn default_envelope_field() -> String {
    "events".to_owned()
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_owned()
}

fn default_extension() -> String {
    "json".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_without_env(yaml: &str) -> Result<MergeConfig, ConfigError> {
        let mut config: MergeConfig = serde_yml::from_str(yaml)?;
        config.apply_overrides(|_| None);
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn default_config_is_valid() {
        let config = MergeConfig::default();
        assert_eq!(config.merge.envelope_field, "events");
        assert_eq!(config.merge.id_field, "id");
        assert_eq!(config.equality.mode, EqualityMode::Structural);
        assert!(config.equality.ignore_fields.is_empty());
        assert_eq!(config.sources.extension, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
merge:
  envelope_field: items
  id_field: uid
equality:
  mode: numeric
  ignore_fields:
    - fetched_at
sources:
  extension: jsonl
logging:
  level: debug
  format: json
";
        let config = parse_without_env(yaml).unwrap();
        assert_eq!(config.merge.envelope_field, "items");
        assert_eq!(config.merge.id_field, "uid");
        assert_eq!(config.equality.mode, EqualityMode::Numeric);
        assert_eq!(config.equality.ignore_fields, vec!["fetched_at".to_owned()]);
        assert_eq!(config.sources.extension, "jsonl");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = parse_without_env("equality:\n  mode: numeric\n").unwrap();
        assert_eq!(config.equality.mode, EqualityMode::Numeric);
        assert_eq!(config.merge, MergeSettings::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = MergeConfig::parse("  \n").unwrap();
        assert_eq!(config.sources, SourcesConfig::default());
        assert_eq!(config.equality, EqualityConfig::default());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = MergeConfig::default();
        config.apply_overrides(|name| match name {
            "FEEDMERGE_ENVELOPE_FIELD" => Some("data".to_owned()),
            "FEEDMERGE_LOG_LEVEL" => Some("warn".to_owned()),
            _ => None,
        });
        assert_eq!(config.merge.envelope_field, "data");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn ignoring_the_id_field_is_rejected() {
        let err = parse_without_env("equality:\n  ignore_fields: [id]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn empty_envelope_field_is_rejected() {
        let err = parse_without_env("merge:\n  envelope_field: ''\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn dotted_extension_is_rejected() {
        let err = parse_without_env("sources:\n  extension: .json\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn unknown_mode_is_a_yaml_error() {
        let err = parse_without_env("equality:\n  mode: fuzzy\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn example_file_matches_defaults() {
        let example = include_str!("../../../feedmerge.example.yaml");
        assert_eq!(parse_without_env(example).unwrap(), MergeConfig::default());
    }
}
