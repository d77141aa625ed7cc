//! `list` command: report stale branches without touching them

use std::io::{self, Write};

use clap::Args;
use sweeper_core::{Config, SweptBranch};

use super::run_sweep;

/// List stale branches
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output the list as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let report = run_sweep(config.request(false, false)).await?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            write_json(&mut out, &report.swept)?;
        } else {
            write_table(&mut out, &report.swept)?;
        }

        Ok(())
    }
}

fn write_table(out: &mut impl Write, branches: &[SweptBranch]) -> io::Result<()> {
    if branches.is_empty() {
        return writeln!(out, "No branches found");
    }

    writeln!(out, "{:<40} {:<40}", "Repository", "Branch")?;
    for entry in branches {
        writeln!(out, "{:<40} {:<40}", entry.repository, entry.branch)?;
    }

    Ok(())
}

fn write_json(out: &mut impl Write, branches: &[SweptBranch]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, branches)?;
    writeln!(out)?;
    Ok(())
}
