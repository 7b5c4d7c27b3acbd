//! Configuration.
//!
//! [`ConfigFile`] is the on-disk INI representation, edited key by key
//! through [`ConfigKey`]. [`BridgeConfig`] is the runtime view handed to
//! the dispatcher.
//!
//! ```ini
//! [session]
//! min_credential_length = 50
//!
//! [assets]
//! verify_files = false
//! load_timeout_secs = 30
//! large_asset_bytes = 52428800
//!
//! [tracking]
//! default_quality = GOOD
//! default_confidence = 0.95
//!
//! [database]
//! default_name = db_fashion
//!
//! [logging]
//! level = info
//! directory =
//! ```

mod bridge;
mod file;
mod keys;

pub use bridge::BridgeConfig;
pub use file::{
    config_file_path, AssetSettings, ConfigError, ConfigFile, DatabaseSettings,
    LoggingSettings, SessionSettings, TrackingSettings,
};
pub use keys::ConfigKey;
