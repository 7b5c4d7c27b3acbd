//! Session and loader configuration.

use std::time::Duration;

/// Minimum accepted credential length in the reference licensing policy.
pub const DEFAULT_MIN_CREDENTIAL_LENGTH: usize = 50;

/// Default time a dispatched `loadModel` waits for its asset (in seconds).
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Assets above this size are logged as progressive loads (50 MiB).
pub const DEFAULT_LARGE_ASSET_BYTES: u64 = 50 * 1024 * 1024;

/// Session lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Credentials shorter than this (in characters) are rejected.
    pub min_credential_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_credential_length: DEFAULT_MIN_CREDENTIAL_LENGTH,
        }
    }
}

impl SessionConfig {
    /// Set the minimum credential length.
    pub fn with_min_credential_length(mut self, length: usize) -> Self {
        self.min_credential_length = length;
        self
    }
}

/// Asset loading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Check that source files exist and are engine-ready before loading.
    ///
    /// When false, every descriptor is accepted as-is.
    pub verify_files: bool,

    /// How long a dispatched load may take before it is cancelled.
    ///
    /// `None` waits indefinitely.
    pub load_timeout: Option<Duration>,

    /// Size above which a load is reported as progressive.
    pub large_asset_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            verify_files: false,
            load_timeout: Some(Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS)),
            large_asset_bytes: DEFAULT_LARGE_ASSET_BYTES,
        }
    }
}

impl LoaderConfig {
    /// Enable or disable file verification.
    pub fn with_verify_files(mut self, verify: bool) -> Self {
        self.verify_files = verify;
        self
    }

    /// Set the load timeout. `None` disables it.
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set the progressive-load threshold.
    pub fn with_large_asset_bytes(mut self, bytes: u64) -> Self {
        self.large_asset_bytes = bytes;
        self
    }
}
