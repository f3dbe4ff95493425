//! Command-line / environment configuration and logging setup.
//!
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::api::http::DEFAULT_API_URL;

#[derive(Debug, Parser)]
#[command(name = "user-manager", version, about = "Manage user records behind a REST API")]
pub struct Cli {
    /// Base URL of the user service.
    #[arg(long, env = "USER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Use a built-in in-memory backend with sample users instead of the API.
    #[arg(long)]
    pub demo: bool,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// File receiving diagnostic logs (the terminal belongs to the UI).
    #[arg(long, env = "USER_MANAGER_LOG", default_value = "user-manager.log")]
    pub log_file: String,

    /// Theme configuration file.
    #[arg(long, default_value = "theme.conf")]
    pub theme: String,

    /// Keybinding configuration file.
    #[arg(long, default_value = "keybinds.conf")]
    pub keybinds: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every user as JSON.
    List,
    /// Print one user as JSON.
    Get {
        /// Server-assigned id.
        id: String,
    },
}

impl Cli {
    pub fn level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::ERROR,
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            3 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Route `tracing` output to `cli.log_file`, filtered by `-v` / `RUST_LOG`.
pub fn init_tracing(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("open log file {}", cli.log_file))?;

    // RUST_LOG=
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_verbosity() {
        let args = ["user-manager", "--api-url", "http://example.test:9000", "-vvv"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.api_url, "http://example.test:9000");
        assert_eq!(cli.level(), tracing::Level::DEBUG);
        assert!(cli.command.is_none());
        assert!(!cli.demo);
    }

    #[test]
    fn get_subcommand_carries_id() {
        let cli = Cli::try_parse_from(["user-manager", "--demo", "get", "abc-123"]).unwrap();
        assert!(cli.demo);
        assert!(matches!(cli.command, Some(Command::Get { id }) if id == "abc-123"));
    }
}
