//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, init, show)
//! - [`report`] - Report for a single location
//! - [`sources`] - List configured report sources
//! - [`watch`] - Reports for a stream of locations read from stdin

pub mod common;
pub mod config;
pub mod report;
pub mod sources;
pub mod watch;
