//! CLI command definitions for galaxy.
//!
//! The main entry point is the `Cli` struct; flags override values from
//! the config file and environment.

use crate::config::{Config, LogLevel};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Galaxy task service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default if no subcommand given)
    Serve,

    /// Apply database migrations and print the schema version
    Migrate,
}

impl Cli {
    /// Fold command-line overrides into the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref path) = self.database {
            config.server.db_path = path.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.verbose {
            config.log.level = LogLevel::Debug;
        }
    }

    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["galaxy"]);
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["galaxy", "--database", "x.db", "--port", "9001", "-v", "migrate"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(cli.command(), Command::Migrate);
        assert_eq!(config.server.db_path, PathBuf::from("x.db"));
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.log.level, LogLevel::Debug);
    }
}
