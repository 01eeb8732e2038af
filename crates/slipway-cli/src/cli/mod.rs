//! CLI for the slipway deployment tool.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use slipway_core::config;
use std::path::PathBuf;

use commands::{
    run_deploy, run_logs, run_migrate, run_plan, run_pull_schema, run_status,
};

/// Top-level CLI for the slipway deployment tool.
#[derive(Debug, Parser)]
#[command(name = "slipway")]
#[command(about = "slipway: deploy builds to the hosted platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Stage files, upload them, create a deployment and wait for it.
    Deploy {
        /// Project root to stage (defaults to the current directory).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Upload sources as a single tar.gz instead of one PUT per file.
        #[arg(long)]
        archive: bool,

        /// Create the deployment but do not wait for a terminal status.
        #[arg(long)]
        no_wait: bool,
    },

    /// Show what would be uploaded, without touching the network.
    Plan {
        /// Project root to stage (defaults to the current directory).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Fetch the current status of a deployment.
    Status {
        /// Deployment identifier.
        id: String,
    },

    /// Fetch build logs for a deployment.
    Logs {
        /// Deployment identifier.
        id: String,
    },

    /// Apply pending SQL migrations via psql.
    Migrate,

    /// Refresh the local schema from the live database.
    PullSchema,

    /// Emit a shell completion script.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Completions need no config (and must work before first-run init).
        if let CliCommand::Completions { shell } = cli.command {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "slipway", &mut std::io::stdout());
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config for project {}", cfg.platform.project);

        match cli.command {
            CliCommand::Deploy {
                root,
                archive,
                no_wait,
            } => run_deploy(&cfg, root, archive, no_wait).await?,
            CliCommand::Plan { root } => run_plan(&cfg, root)?,
            CliCommand::Status { id } => run_status(&cfg, &id).await?,
            CliCommand::Logs { id } => run_logs(&cfg, &id).await?,
            CliCommand::Migrate => run_migrate(&cfg).await?,
            CliCommand::PullSchema => run_pull_schema(&cfg).await?,
            CliCommand::Completions { .. } => unreachable!("handled above"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
