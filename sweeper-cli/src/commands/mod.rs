//! CLI command implementations

pub mod list;
pub mod prune;

pub use list::ListArgs;
pub use prune::PruneArgs;

use std::future::Future;

use sweeper_core::{CancelFlag, GitOpener, SweepReport, SweepRequest, Sweeper};
use tokio::task::JoinHandle;

/// Run a sweep off the async runtime, stopping early on Ctrl-C
pub async fn run_sweep(request: SweepRequest) -> anyhow::Result<SweepReport> {
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();

    let task = tokio::task::spawn_blocking(move || {
        Sweeper::new(GitOpener)
            .with_cancel(worker_cancel)
            .run(&request)
    });

    let report = await_sweep(task, cancel, tokio::signal::ctrl_c()).await?;

    if report.cancelled {
        tracing::warn!("Sweep was interrupted; results are partial");
    }
    if !report.errors.is_empty() {
        tracing::warn!(errors = report.errors.len(), "Sweep finished with errors");
    }

    Ok(report)
}

/// Wait for the sweep task, cancelling it when `interrupt` fires
///
/// An interrupt that resolves with an error (no signal handler) leaves the
/// sweep running to completion.
async fn await_sweep(
    mut task: JoinHandle<sweeper_core::Result<SweepReport>>,
    cancel: CancelFlag,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> anyhow::Result<SweepReport> {
    let joined = tokio::select! {
        joined = &mut task => joined,
        signal = interrupt => {
            match signal {
                Ok(()) => {
                    tracing::warn!("Interrupted, stopping after the current branch");
                    cancel.cancel();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot listen for Ctrl-C; sweep will run to completion");
                }
            }
            task.await
        }
    };

    Ok(joined??)
}
