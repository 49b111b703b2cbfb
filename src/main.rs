use std::sync::Arc;

use anyhow::{Context, Result};
use lcdmon::bus::{SnapshotSlot, StateCell};
use lcdmon::config::AppConfig;
use lcdmon::metrics::{self, PollerDeps};
use lcdmon::models::WanStatus;
use lcdmon::panel::Ili9488;
use lcdmon::runloop::{self, RenderInputs};
use lcdmon::version;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!("{} v{} starting", version::NAME, version::VERSION);

    let cfg = AppConfig::load()?;

    // Panel init is fatal: exit nonzero so the supervisor restarts us.
    let spi_cfg = cfg.spi.clone();
    let panel = tokio::task::spawn_blocking(move || -> Result<Ili9488> {
        let mut panel = Ili9488::open(&spi_cfg)?;
        panel.init()?;
        Ok(panel)
    })
    .await
    .context("panel init task")?
    .context("panel init")?;

    let slot = Arc::new(SnapshotSlot::new());
    let wan = Arc::new(StateCell::new(WanStatus::Checking));
    let printer = Arc::new(StateCell::default());

    let cancel = CancellationToken::new();
    let tracker = TaskTracker::new();

    metrics::spawn_pollers(
        &cfg,
        PollerDeps {
            slot: slot.clone(),
            wan: wan.clone(),
            printer: printer.clone(),
        },
        &tracker,
        &cancel,
    );
    tracker.close();

    let render_cancel = cancel.clone();
    let render_handle = tokio::task::spawn_blocking(move || {
        runloop::run(
            cfg,
            panel,
            RenderInputs {
                slot,
                wan,
                printer,
            },
            render_cancel,
        );
    });

    wait_for_shutdown().await;
    tracing::info!("received shutdown signal");
    cancel.cancel();

    tracker.wait().await;
    render_handle.await.context("render thread")?;
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
