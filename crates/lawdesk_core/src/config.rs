//! Application configuration.
//!
//! # Responsibility
//! - Load `AppConfig` from an optional TOML file on top of compiled defaults.
//! - Reject values that would make later stages misbehave.
//!
//! # Invariants
//! - Every field has a default; an empty file yields `AppConfig::default()`.
//! - A loaded config has passed `validate()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding `storage.db_path`.
pub const DB_PATH_ENV: &str = "LAWDESK_DB_PATH";
/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "LAWDESK_LOG_LEVEL";

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: String,
        message: String,
    },
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => write!(f, "invalid TOML in `{path}`: {message}"),
            Self::Invalid { field, message } => write!(f, "invalid config {field}: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub firm: FirmConfig,
    pub backup: BackupConfig,
    pub lookup: LookupConfig,
    pub proposal: ProposalLayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("lawdesk.sqlite3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

/// Letterhead identity printed on proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmConfig {
    pub name: String,
    pub address: String,
    /// City printed in the proposal date line.
    pub default_location: String,
}

impl Default for FirmConfig {
    fn default() -> Self {
        Self {
            name: "SALOMÃO ADVOGADOS".to_string(),
            address: "Rio de Janeiro - RJ".to_string(),
            default_location: "Rio de Janeiro".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub dir: PathBuf,
    /// Local hour from which the automatic daily backup may run.
    pub auto_hour: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("backups"),
            auto_hour: 19,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub cnpj_base_url: String,
    pub cep_base_url: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cnpj_base_url: "https://brasilapi.com.br".to_string(),
            cep_base_url: "https://viacep.com.br".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Page geometry used to paginate the proposal preview, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalLayoutConfig {
    pub page_height: f64,
    /// Header band as a percentage of page height.
    pub header_pct: f64,
    /// Footer band as a percentage of page height.
    pub footer_pct: f64,
    pub line_height: f64,
    pub paragraph_spacing: f64,
    pub chars_per_line: usize,
}

impl Default for ProposalLayoutConfig {
    fn default() -> Self {
        Self {
            page_height: 1123.0,
            header_pct: 15.0,
            footer_pct: 10.0,
            line_height: 22.0,
            paragraph_spacing: 12.0,
            chars_per_line: 90,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `path` when given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&text, &path.display().to_string())?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(text, "<string>")?;
        config.validate()?;
        Ok(config)
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            path: origin.to_string(),
            message: err.to_string(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(DB_PATH_ENV) {
            if !value.trim().is_empty() {
                self.storage.db_path = PathBuf::from(value);
            }
        }
        if let Ok(value) = std::env::var(LOG_LEVEL_ENV) {
            if !value.trim().is_empty() {
                self.logging.level = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(invalid("storage.db_path", "must not be empty"));
        }
        if self.backup.auto_hour > 23 {
            return Err(invalid(
                "backup.auto_hour",
                format!("must be 0..=23, got {}", self.backup.auto_hour),
            ));
        }
        if self.lookup.timeout_secs == 0 {
            return Err(invalid("lookup.timeout_secs", "must be positive"));
        }

        let layout = &self.proposal;
        if !(layout.page_height > 0.0) {
            return Err(invalid("proposal.page_height", "must be positive"));
        }
        if !(layout.line_height > 0.0) {
            return Err(invalid("proposal.line_height", "must be positive"));
        }
        if layout.paragraph_spacing < 0.0 {
            return Err(invalid("proposal.paragraph_spacing", "must not be negative"));
        }
        if layout.chars_per_line == 0 {
            return Err(invalid("proposal.chars_per_line", "must be positive"));
        }
        if layout.header_pct < 0.0 || layout.footer_pct < 0.0 {
            return Err(invalid("proposal.header_pct", "margins must not be negative"));
        }
        if layout.header_pct + layout.footer_pct >= 100.0 {
            return Err(invalid(
                "proposal.header_pct",
                "header and footer must leave room for content",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}
