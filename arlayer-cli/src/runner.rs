//! Shared setup for commands that talk to the bridge.

use arlayer::config::{BridgeConfig, ConfigFile};
use arlayer::logging::{init_logging, LoggingConfig, LoggingGuard};
use arlayer::protocol::Dispatcher;
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Owns the loaded configuration, the logging guard, and the runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load configuration, install logging, and start the runtime.
    ///
    /// `verbose` forces debug-level logging regardless of the config file.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut logging = LoggingConfig::from_config_file(&config);
        if verbose {
            logging = logging.with_level("debug");
        }
        let guard = init_logging(&logging)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("arlayer-worker")
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            _logging: guard,
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// A dispatcher configured from the loaded file.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            BridgeConfig::from_config_file(&self.config),
            self.runtime.handle().clone(),
        )
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = arlayer::VERSION,
            command,
            min_credential_length = self.config.session.min_credential_length,
            verify_files = self.config.assets.verify_files,
            "ARLayer starting"
        );
    }
}
