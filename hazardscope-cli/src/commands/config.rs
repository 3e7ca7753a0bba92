//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show` for locating,
//! creating and inspecting the configuration file.

use clap::Subcommand;
use hazardscope::config::ConfigFile;

use crate::error::CliError;
use crate::runner::GlobalOptions;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as INI
    Show {
        /// Print the built-in defaults instead of the loaded file
        #[arg(long)]
        defaults: bool,
    },
}

/// Run a config subcommand.
pub fn run(options: &GlobalOptions, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(options),
        ConfigCommands::Init { force } => run_init(options, force),
        ConfigCommands::Show { defaults } => run_show(options, defaults),
    }
}

/// Show the configuration file path.
fn run_path(options: &GlobalOptions) -> Result<(), CliError> {
    let path = options.config_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("(not created yet; built-in defaults are in effect)");
    }
    Ok(())
}

/// Write the default configuration file.
fn run_init(options: &GlobalOptions, force: bool) -> Result<(), CliError> {
    let path = options.config_path();

    if path.exists() && !force {
        println!("Configuration file already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    if force {
        ConfigFile::default().save_to(&path)?;
    } else {
        ConfigFile::ensure_exists_at(&path)?;
    }
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Print the effective configuration.
fn run_show(options: &GlobalOptions, defaults: bool) -> Result<(), CliError> {
    let config = if defaults {
        ConfigFile::default()
    } else {
        options.load_config()?
    };
    print!("{}", config.to_ini_string());
    Ok(())
}
