//! CLI module for the retryscope console
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the console server
//! - `status` - Show a running console's status
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the console with default config
//! retryscope serve
//!
//! # Inspect a running instance
//! retryscope status --url http://127.0.0.1:8700
//!
//! # Generate shell completions
//! retryscope completions bash > ~/.bash_completion.d/retryscope
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod serve;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Retryscope - observability console for HTTP retry interceptors
#[derive(Parser, Debug)]
#[command(
    name = "retryscope",
    version,
    about = "Observability console for HTTP retry interceptors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the console server
    Serve(ServeArgs),
    /// Show a running console's status
    Status(StatusArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "retryscope.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "RETRYSCOPE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "RETRYSCOPE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RETRYSCOPE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base URL of the running console
    #[arg(short, long, default_value = "http://127.0.0.1:8700")]
    pub url: String,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write an example configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the configuration file
    #[arg(short, long, default_value = "retryscope.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["retryscope", "serve"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("retryscope.toml"));
                assert!(args.port.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn status_url_override() {
        let cli = Cli::parse_from(["retryscope", "status", "--url", "http://localhost:9000"]);
        match cli.command {
            Commands::Status(args) => assert_eq!(args.url, "http://localhost:9000"),
            _ => panic!("expected status"),
        }
    }
}
