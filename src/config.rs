//! Runtime configuration.
//!
//! Settings are read from YAML. Every field has a default, so an empty
//! document yields a usable configuration:
//!
//! ```yaml
//! logger:
//!   enable: true
//!   level: debug
//!   format: json
//! classification:
//!   parallel: false
//!   check_redundancy: true
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logger: LoggerSettings,
    #[serde(default)]
    pub classification: ClassificationSettings,
}

impl Config {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    /// Full `EnvFilter` directive replacing the crate-scoped default, e.g.
    /// `normal_form=trace,info`.
    #[serde(default)]
    pub override_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::default(),
            format: LogFormat::default(),
            override_filter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Classification run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSettings {
    /// Process concepts of the same rank concurrently. Has no effect when the
    /// crate is built without the `parallel` feature.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Re-check after every concept that no generated group implies another.
    #[serde(default)]
    pub check_redundancy: bool,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            check_redundancy: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::{Config, LogFormat, LogLevel};
    use crate::Error;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml_str("").expect("config");
        assert_eq!(config, Config::default());
        assert!(config.logger.enable);
        assert_eq!(config.logger.level, LogLevel::Info);
        assert!(config.classification.parallel);
        assert!(!config.classification.check_redundancy);
    }

    #[test]
    fn partial_documents_keep_remaining_defaults() {
        let config = Config::from_yaml_str(
            r"
logger:
  level: trace
  format: json
classification:
  check_redundancy: true
",
        )
        .expect("config");
        assert!(config.logger.enable);
        assert_eq!(config.logger.level, LogLevel::Trace);
        assert_eq!(config.logger.format, LogFormat::Json);
        assert!(config.classification.parallel);
        assert!(config.classification.check_redundancy);
    }

    #[test]
    fn rejects_unknown_levels() {
        let err = Config::from_yaml_str("logger:\n  level: loud\n").expect_err("invalid level");
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn reads_configuration_files() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("normal-form-config-{suffix}.yaml"));
        fs::write(&path, "classification:\n  parallel: false\n").expect("config file");

        let config = Config::from_file(&path).expect("config");
        assert!(!config.classification.parallel);
        let _ = fs::remove_file(path);

        let missing = Config::from_file(std::env::temp_dir().join("normal-form-missing.yaml"));
        assert!(matches!(missing, Err(Error::Io { .. })));
    }
}
