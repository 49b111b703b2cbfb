// Background pollers feeding the snapshot bus

pub mod printer;
pub mod rcon;
pub mod system;
pub mod wan;
pub mod wireguard;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::bus::{SnapshotSlot, StateCell};
use crate::config::AppConfig;
use crate::models::{MetricsSnapshot, PrinterMetrics, WanStatus};

/// Shared state the pollers write and the render loop reads.
pub struct PollerDeps {
    pub slot: Arc<SnapshotSlot<MetricsSnapshot>>,
    pub wan: Arc<StateCell<WanStatus>>,
    pub printer: Arc<StateCell<PrinterMetrics>>,
}

/// Start the system, WAN and printer pollers on the tracker. Each observes
/// the cancellation token between operations and joins cleanly.
pub fn spawn_pollers(
    cfg: &AppConfig,
    deps: PollerDeps,
    tracker: &TaskTracker,
    cancel: &CancellationToken,
) {
    tracker.spawn(system::run(cfg.clone(), deps.slot, cancel.clone()));
    tracker.spawn(wan::run(deps.wan, cancel.clone()));
    if cfg.printer.base_url.is_empty() {
        tracing::info!("printer poller disabled (PRINTER_URL empty)");
    } else {
        tracker.spawn(printer::run(
            cfg.printer.clone(),
            deps.printer,
            cancel.clone(),
        ));
    }
}

/// Run an external command under a wall-clock timeout. The child is killed
/// on expiry or drop; stdout is returned regardless of exit status, since
/// tools like `ping` report useful output on nonzero exits.
pub(crate) async fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String> {
    let output = tokio::time::timeout(
        timeout,
        Command::new(program).args(args).kill_on_drop(true).output(),
    )
    .await
    .with_context(|| format!("{program} timed out after {timeout:?}"))?
    .with_context(|| format!("running {program}"))?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
