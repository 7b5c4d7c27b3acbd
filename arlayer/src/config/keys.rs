//! Addressable configuration keys (`section.key`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile};
use crate::tracking::TrackingQuality;

/// Every setting in [`ConfigFile`], addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SessionMinCredentialLength,
    AssetsVerifyFiles,
    AssetsLoadTimeoutSecs,
    AssetsLargeAssetBytes,
    TrackingDefaultQuality,
    TrackingDefaultConfidence,
    DatabaseDefaultName,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::SessionMinCredentialLength,
    ConfigKey::AssetsVerifyFiles,
    ConfigKey::AssetsLoadTimeoutSecs,
    ConfigKey::AssetsLargeAssetBytes,
    ConfigKey::TrackingDefaultQuality,
    ConfigKey::TrackingDefaultConfidence,
    ConfigKey::DatabaseDefaultName,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        ALL_KEYS
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::SessionMinCredentialLength => "session",
            ConfigKey::AssetsVerifyFiles
            | ConfigKey::AssetsLoadTimeoutSecs
            | ConfigKey::AssetsLargeAssetBytes => "assets",
            ConfigKey::TrackingDefaultQuality | ConfigKey::TrackingDefaultConfidence => "tracking",
            ConfigKey::DatabaseDefaultName => "database",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::SessionMinCredentialLength => "min_credential_length",
            ConfigKey::AssetsVerifyFiles => "verify_files",
            ConfigKey::AssetsLoadTimeoutSecs => "load_timeout_secs",
            ConfigKey::AssetsLargeAssetBytes => "large_asset_bytes",
            ConfigKey::TrackingDefaultQuality => "default_quality",
            ConfigKey::TrackingDefaultConfidence => "default_confidence",
            ConfigKey::DatabaseDefaultName => "default_name",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SessionMinCredentialLength => {
                config.session.min_credential_length.to_string()
            }
            ConfigKey::AssetsVerifyFiles => config.assets.verify_files.to_string(),
            ConfigKey::AssetsLoadTimeoutSecs => config.assets.load_timeout_secs.to_string(),
            ConfigKey::AssetsLargeAssetBytes => config.assets.large_asset_bytes.to_string(),
            ConfigKey::TrackingDefaultQuality => config.tracking.default_quality.to_string(),
            ConfigKey::TrackingDefaultConfidence => config.tracking.default_confidence.to_string(),
            ConfigKey::DatabaseDefaultName => config.database.default_name.clone(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse and store a value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the text does not parse; the
    /// configuration is unchanged in that case.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };

        match self {
            ConfigKey::SessionMinCredentialLength => {
                config.session.min_credential_length =
                    value.parse().map_err(|e| invalid(format!("{}", e)))?;
            }
            ConfigKey::AssetsVerifyFiles => {
                config.assets.verify_files = parse_bool(value).ok_or_else(|| {
                    invalid("expected true/false, yes/no, or 1/0".to_string())
                })?;
            }
            ConfigKey::AssetsLoadTimeoutSecs => {
                config.assets.load_timeout_secs =
                    value.parse().map_err(|e| invalid(format!("{}", e)))?;
            }
            ConfigKey::AssetsLargeAssetBytes => {
                config.assets.large_asset_bytes =
                    value.parse().map_err(|e| invalid(format!("{}", e)))?;
            }
            ConfigKey::TrackingDefaultQuality => {
                config.tracking.default_quality =
                    value.parse::<TrackingQuality>().map_err(invalid)?;
            }
            ConfigKey::TrackingDefaultConfidence => {
                let confidence: f32 = value.parse().map_err(|e| invalid(format!("{}", e)))?;
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(invalid("must be between 0 and 1".to_string()));
                }
                config.tracking.default_confidence = confidence;
            }
            ConfigKey::DatabaseDefaultName => {
                if value.is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                config.database.default_name = value.to_string();
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid(format!("expected one of {}", LOG_LEVELS.join(", "))));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
