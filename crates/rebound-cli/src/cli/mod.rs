//! CLI for the rebound resilient HTTP client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rebound_core::config::{self, ReboundConfig};
use std::path::PathBuf;

use commands::{run_classify, run_fetch, run_policy, FetchArgs};

/// Top-level CLI for rebound.
#[derive(Debug, Parser)]
#[command(name = "rebound")]
#[command(about = "rebound: HTTP GET with status-aware retries and backoff", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// GET a path (or absolute URL), retrying transient failures, and print the body.
    Fetch {
        /// Path resolved against the configured base URL, or an absolute URL.
        path: String,
        /// Override the configured base URL.
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Override the configured maximum number of attempts.
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,
        /// Give up (cancel) if the whole retry sequence takes longer than this.
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,
    },

    /// Show how a status code is classified under the configured policy.
    Classify {
        /// HTTP status code, e.g. 503.
        status: u16,
    },

    /// Print the effective retry policy and its backoff schedule.
    Policy,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                path,
                base_url,
                max_attempts,
                deadline,
            } => {
                let args = FetchArgs {
                    path,
                    base_url,
                    max_attempts,
                    deadline,
                };
                run_fetch(&cfg, args).await?
            }
            CliCommand::Classify { status } => run_classify(&cfg, status)?,
            CliCommand::Policy => run_policy(&cfg)?,
        }

        Ok(())
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ReboundConfig> {
    match path {
        Some(path) => config::load_from(path),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;
