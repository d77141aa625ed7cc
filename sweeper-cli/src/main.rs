//! branch-sweeper CLI
//!
//! Identify and remove stale git branches across local repositories.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sweeper_core::{Config, Overrides};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ListArgs, PruneArgs};

/// Identify and remove stale Git branches across local repositories
#[derive(Parser, Debug)]
#[command(name = "branch-sweeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory to scan for Git repos
    #[arg(short, long, global = true, env = "BRANCH_SWEEPER_PATH")]
    path: Option<PathBuf>,

    /// Minimum days since last commit to mark a branch stale
    #[arg(
        short,
        long,
        global = true,
        allow_negative_numbers = true,
        env = "BRANCH_SWEEPER_DAYS"
    )]
    days: Option<i64>,

    /// Only include branches already merged into the base branch
    #[arg(short, long, global = true, overrides_with = "no_merged")]
    merged: bool,

    /// Include unmerged branches even if the config file says otherwise
    #[arg(long, global = true, overrides_with = "merged")]
    no_merged: bool,

    /// Base branch name to check merges against
    #[arg(short, long, global = true, env = "BRANCH_SWEEPER_BASE")]
    base: Option<String>,

    /// Only consider branches matching this glob (e.g. "feature/*")
    #[arg(long, global = true)]
    include: Option<String>,

    /// Never consider branches matching this glob (e.g. "{release,hotfix}/*")
    #[arg(long, global = true)]
    exclude: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stale branches
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Delete stale branches
    Prune(PruneArgs),

    /// Show current configuration
    Config,
}

impl Cli {
    fn merged_override(&self) -> Option<bool> {
        if self.merged {
            Some(true)
        } else if self.no_merged {
            Some(false)
        } else {
            None
        }
    }

    fn overrides(&self, remote_name: Option<String>) -> Overrides {
        Overrides {
            path: self.path.clone(),
            days: self.days,
            base: self.base.clone(),
            merged: self.merged_override(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            remote_name,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let remote_name = match &cli.command {
        Some(Commands::Prune(args)) => args.remote_name.clone(),
        _ => None,
    };

    let config = Config::load_with_overrides(cli.overrides(remote_name))?;

    if cli.verbose {
        tracing::info!(
            path = %config.sweep.path.display(),
            days = config.sweep.days,
            base = %config.sweep.base,
            merged = config.sweep.merged,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::List(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Prune(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("branch-sweeper Configuration");
            println!("============================");
            println!();
            println!("Sweep Settings:");
            println!("  path:    {}", config.sweep.path.display());
            println!("  days:    {}", config.sweep.days);
            println!("  base:    {}", config.sweep.base);
            println!("  merged:  {}", config.sweep.merged);
            println!("  include: {}", config.sweep.include.as_deref().unwrap_or("(none)"));
            println!("  exclude: {}", config.sweep.exclude.as_deref().unwrap_or("(none)"));
            println!();
            println!("Remote Settings:");
            println!("  name:     {}", config.remote.name);
            println!("  ssh_user: {}", config.remote.ssh_user);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("branch-sweeper - Identify and remove stale Git branches");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
