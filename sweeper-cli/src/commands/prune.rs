//! `prune` command: delete stale branches locally and optionally on a remote

use std::io::{self, Write};

use clap::Args;
use sweeper_core::{Config, SweptBranch};

use super::run_sweep;

/// Delete stale branches
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Delete matching branch on the remote repository (requires your SSH
    /// public key loaded in ssh-agent for auth)
    #[arg(short, long)]
    pub remote: bool,

    /// Name of Git remote (defaults to config, then "origin")
    #[arg(long, env = "BRANCH_SWEEPER_REMOTE")]
    pub remote_name: Option<String>,
}

impl PruneArgs {
    /// Execute the prune command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let report = run_sweep(config.request(true, self.remote)).await?;

        if report.swept.is_empty() {
            tracing::error!("No branches found, nothing to delete");
            return Ok(());
        }

        let stdout = io::stdout();
        write_deleted(&mut stdout.lock(), &report.swept)?;

        Ok(())
    }
}

fn write_deleted(out: &mut impl Write, branches: &[SweptBranch]) -> io::Result<()> {
    for entry in branches {
        writeln!(out, "{}/{} deleted", entry.repository, entry.branch)?;
    }
    Ok(())
}
