//! INI configuration file.
//!
//! Lives at `<config_dir>/arlayer/config.ini`. A missing file means all
//! defaults; unknown sections and keys are ignored on load so that older
//! binaries can read newer files.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::protocol::DEFAULT_DATABASE_NAME;
use crate::session::{
    DEFAULT_LARGE_ASSET_BYTES, DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_MIN_CREDENTIAL_LENGTH,
};
use crate::tracking::{TrackingQuality, DEFAULT_CONFIDENCE, DEFAULT_QUALITY};

/// Errors from reading, writing, or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Path of the configuration file.
///
/// Falls back to the working directory when the platform has no config
/// directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arlayer")
        .join("config.ini")
}

/// `[session]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub min_credential_length: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_credential_length: DEFAULT_MIN_CREDENTIAL_LENGTH,
        }
    }
}

/// `[assets]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSettings {
    pub verify_files: bool,
    /// Zero disables the timeout.
    pub load_timeout_secs: u64,
    pub large_asset_bytes: u64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            verify_files: false,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            large_asset_bytes: DEFAULT_LARGE_ASSET_BYTES,
        }
    }
}

/// `[tracking]`
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub default_quality: TrackingQuality,
    pub default_confidence: f32,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub default_name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    /// `None` logs to stderr only.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub session: SessionSettings,
    pub assets: AssetSettings,
    pub tracking: TrackingSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for key in super::ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save to [`config_file_path`], creating parent directories.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "Config file saved");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }
}
