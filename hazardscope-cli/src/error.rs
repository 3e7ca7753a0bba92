//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use hazardscope::config::ConfigFileError;
use hazardscope::coord::CoordError;
use hazardscope::provider::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to read or write the config file
    ConfigFile(ConfigFileError),
    /// Failed to create the HTTP client
    ClientCreation(ServiceError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Invalid click coordinates
    InvalidPoint(CoordError),
    /// Failed reading click input
    Input(std::io::Error),
    /// The aggregator stopped before rendering a report
    ReportAborted,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Check the value in your config file, or print the");
                eprintln!("built-in defaults with: hazardscope config show --defaults");
            }
            CliError::InvalidPoint(_) => {
                eprintln!();
                eprintln!("Latitude must be within -90..90 and longitude within -180..180.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::ClientCreation(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::InvalidPoint(e) => write!(f, "Invalid location: {}", e),
            CliError::Input(e) => write!(f, "Failed to read input: {}", e),
            CliError::ReportAborted => write!(f, "Report aborted before all sources reported"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::ClientCreation(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::InvalidPoint(e) => Some(e),
            CliError::Input(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidPoint(e)
    }
}
