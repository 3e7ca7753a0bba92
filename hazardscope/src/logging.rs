//! Logging infrastructure for hazardscope.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to the configured log file (cleared on session start)
//! - Optionally mirrors to stderr so reports on stdout stay clean
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Options for [`init_logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOptions {
    /// Mirror log output to stderr
    pub console: bool,
    /// Default to DEBUG instead of INFO when RUST_LOG is unset
    pub debug: bool,
}

/// Default filter directive when RUST_LOG is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "hazardscope=debug,info"
    } else {
        "info"
    }
}

/// Creates the parent directory of `log_path` and truncates the file.
fn prepare_log_file(log_path: &Path) -> Result<(), io::Error> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(log_path, "")
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file,
/// and installs the global subscriber.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_path: &Path, options: LoggingOptions) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_path)?;

    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .pretty();

    let console_layer = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(options.debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
