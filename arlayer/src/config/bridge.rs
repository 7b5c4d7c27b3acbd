//! Runtime configuration for the dispatcher.

use std::time::Duration;

use super::file::ConfigFile;
use crate::protocol::DEFAULT_DATABASE_NAME;
use crate::session::{LoaderConfig, SessionConfig};
use crate::tracking::TrackingConfig;

/// Everything a [`Dispatcher`](crate::protocol::Dispatcher) needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub session: SessionConfig,
    pub loader: LoaderConfig,
    pub tracking: TrackingConfig,
    /// Database reported before any `loadDatabase`.
    pub database_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            loader: LoaderConfig::default(),
            tracking: TrackingConfig::default(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Translate the configuration file into runtime settings.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let load_timeout = match config.assets.load_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            session: SessionConfig::default()
                .with_min_credential_length(config.session.min_credential_length),
            loader: LoaderConfig::default()
                .with_verify_files(config.assets.verify_files)
                .with_load_timeout(load_timeout)
                .with_large_asset_bytes(config.assets.large_asset_bytes),
            tracking: TrackingConfig::default()
                .with_quality(config.tracking.default_quality)
                .with_confidence(config.tracking.default_confidence),
            database_name: config.database.default_name.clone(),
        }
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_tracking(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingQuality;

    #[test]
    fn test_defaults_match_file_defaults() {
        assert_eq!(
            BridgeConfig::from_config_file(&ConfigFile::default()),
            BridgeConfig::default()
        );
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut file = ConfigFile::default();
        file.assets.load_timeout_secs = 0;
        let config = BridgeConfig::from_config_file(&file);
        assert_eq!(config.loader.load_timeout, None);
    }

    #[test]
    fn test_file_values_carried() {
        let mut file = ConfigFile::default();
        file.session.min_credential_length = 12;
        file.tracking.default_quality = TrackingQuality::Limited;
        file.database.default_name = "db_shoes".to_string();

        let config = BridgeConfig::from_config_file(&file);
        assert_eq!(config.session.min_credential_length, 12);
        assert_eq!(config.tracking.default_quality, TrackingQuality::Limited);
        assert_eq!(config.database_name, "db_shoes");
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::default()
            .with_session(SessionConfig::default().with_min_credential_length(1))
            .with_loader(LoaderConfig::default().with_load_timeout(None))
            .with_database_name("db_x");
        assert_eq!(config.session.min_credential_length, 1);
        assert_eq!(config.loader.load_timeout, None);
        assert_eq!(config.database_name, "db_x");
    }
}
