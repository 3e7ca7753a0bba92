//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation and
//! aggregator wiring so command handlers stay small.

use std::path::PathBuf;
use std::sync::Arc;

use hazardscope::config::{config_file_path, ConfigFile};
use hazardscope::logging::{init_logging, LoggingGuard, LoggingOptions};
use hazardscope::provider::{AsyncReqwestClient, SourceFactory};
use hazardscope::report::{HazardReportAggregator, ReportSink};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file override
    pub config: Option<PathBuf>,
    /// Default to debug-level logging
    pub debug: bool,
    /// Mirror logs to stderr
    pub verbose: bool,
}

impl GlobalOptions {
    /// Path of the config file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }

    /// Load the config file in effect (defaults if it doesn't exist).
    pub fn load_config(&self) -> Result<ConfigFile, CliError> {
        Ok(ConfigFile::load_from(&self.config_path())?)
    }
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    config_path: PathBuf,
    runtime: Runtime,
}

impl CliRunner {
    /// Load config, initialize logging and start the async runtime.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config_path = options.config_path();
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(
            &config.logging.file,
            LoggingOptions {
                console: options.verbose,
                debug: options.debug,
            },
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("hazardscope-worker")
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
            runtime,
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("hazardscope v{}", hazardscope::VERSION);
        info!(
            config = %self.config_path.display(),
            sources = self.config.sources.len(),
            "hazardscope CLI: {} command",
            command
        );
    }

    /// Build live sources from the config and wrap them in an aggregator.
    pub fn create_aggregator(
        &self,
        sink: Arc<dyn ReportSink>,
    ) -> Result<HazardReportAggregator, CliError> {
        let client = AsyncReqwestClient::with_timeout(self.config.report.http_timeout_secs)
            .map_err(CliError::ClientCreation)?;
        let sources = SourceFactory::new(client).create_all(&self.config.sources);
        info!(sources = sources.len(), "Sources created");

        Ok(HazardReportAggregator::new(sources, self.config.aggregator_settings(), sink))
    }
}
