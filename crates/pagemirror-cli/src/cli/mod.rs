//! CLI for pagemirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use pagemirror_core::config::{self, MirrorConfig};
use std::path::PathBuf;

use commands::{run_clone, run_completions, run_config};

/// Top-level CLI for pagemirror.
#[derive(Debug, Parser)]
#[command(name = "pagemirror")]
#[command(about = "pagemirror: save a web page and its assets for offline viewing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a page and its images, stylesheets and scripts, rewriting links to the local copies.
    Clone {
        /// Absolute http(s) URL of the page.
        url: String,

        /// Directory to write index.html and asset folders into (created if missing).
        #[arg(short, long, default_value = "cloned_website")]
        output: PathBuf,

        /// Per-request deadline in seconds (overrides config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// User-Agent header (overrides config).
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,
    },

    /// Show the config file location and effective settings.
    Config,

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Apply command-line overrides on top of the loaded config.
fn apply_overrides(cfg: &mut MirrorConfig, timeout: Option<u64>, user_agent: Option<String>) {
    if let Some(secs) = timeout {
        cfg.request_timeout_secs = secs;
    }
    if let Some(ua) = user_agent {
        cfg.user_agent = ua;
    }
}

/// Config file if readable; built-in defaults otherwise, so a missing HOME does not stop a clone.
fn load_config() -> MirrorConfig {
    match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("using default config: {:#}", e);
            MirrorConfig::default()
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Clone {
                url,
                output,
                timeout,
                user_agent,
            } => {
                let mut cfg = load_config();
                apply_overrides(&mut cfg, timeout, user_agent);
                tracing::debug!("effective config: {:?}", cfg);
                run_clone(&cfg, &url, &output)?;
            }
            CliCommand::Config => run_config()?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
