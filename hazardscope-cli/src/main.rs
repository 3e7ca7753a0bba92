//! hazardscope CLI - Command-line interface
//!
//! This binary provides a command-line interface to the hazardscope library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::report::ReportArgs;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "hazardscope")]
#[command(version = hazardscope::VERSION)]
#[command(about = "Hazard site reports for a map location", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.hazardscope/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug-level logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the hazard report for one location
    Report {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Also list each source's finding status
        #[arg(long)]
        status: bool,
    },

    /// Read 'lat,lon' lines from stdin; each line supersedes the previous click
    Watch,

    /// List configured report sources in report order
    Sources,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        debug: cli.debug,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Report { lat, lon, status } => commands::report::run(
            &options,
            ReportArgs {
                lat,
                lon,
                show_status: status,
            },
        ),
        Commands::Watch => commands::watch::run(&options),
        Commands::Sources => commands::sources::run(&options),
        Commands::Config { command } => commands::config::run(&options, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "hazardscope",
            "report",
            "--lat",
            "34.05",
            "--lon",
            "-118.25",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { lat, lon, status } => {
                assert_eq!(lat, 34.05);
                assert_eq!(lon, -118.25);
                assert!(!status);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["hazardscope", "sources", "--config", "/tmp/h.ini", "--debug"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/h.ini")));
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Sources));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["hazardscope", "config", "show", "--defaults"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Show { defaults: true }
            }
        ));
    }
}
