// Render loop: clock frames, diff, push, account

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bus::{SnapshotSlot, StateCell};
use crate::config::AppConfig;
use crate::differ::{DirtyDiffer, FramePlan};
use crate::models::{MetricsSnapshot, PrinterMetrics, WanStatus};
use crate::panel::Ili9488;
use crate::render::{AnimationEngine, DISPLAY_WIDTH, Frame, IdleController, Renderer, luts};

const PERF_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Shared state the render loop reads.
pub struct RenderInputs {
    pub slot: Arc<SnapshotSlot<MetricsSnapshot>>,
    pub wan: Arc<StateCell<WanStatus>>,
    pub printer: Arc<StateCell<PrinterMetrics>>,
}

#[derive(Debug, Default)]
struct PerfCounters {
    render_time: Duration,
    spi_time: Duration,
    bytes_sent: usize,
    render_frames: u32,
    spi_frames: u32,
    last_dirty_rects: usize,
    last_dirty_area: usize,
}

/// Blocking frame loop; owns the panel until shutdown. Runs until the
/// cancellation token fires, then quiesces the panel.
pub fn run(cfg: AppConfig, mut panel: Ili9488, inputs: RenderInputs, cancel: CancellationToken) {
    luts::init();

    let mut renderer = Renderer::new(&cfg, DISPLAY_WIDTH);
    let mut animator = AnimationEngine::new();
    let mut idle = IdleController::new();
    let mut differ = DirtyDiffer::new(&cfg.differ);

    let mut current = Frame::new();
    let mut previous = Frame::new();
    let screen_area = current.width * current.height;

    let mut metrics = MetricsSnapshot::default();
    let mut first_frame = true;
    let mut anim_burst: u32 = 0;

    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut last_log = Instant::now();
    let mut perf = PerfCounters::default();

    while !cancel.is_cancelled() {
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last_frame).as_secs_f64();
        last_frame = frame_start;

        // A fresh snapshot feeds the charts and buys a few guaranteed
        // frames so animations land even under the idle FPS cap.
        if let Some(snapshot) = inputs.slot.try_take() {
            metrics = snapshot;
            renderer.update_histories(&metrics);
            renderer.update_ticker(&metrics, inputs.wan.get());
            anim_burst = cfg.render.anim_burst_frames;
        }

        animator.set_target("cpu", metrics.cpu_pct);
        animator.set_target("temp", metrics.temp_c);
        animator.set_target("net1", metrics.net1_mbps);
        animator.set_target("net2", metrics.net2_mbps);
        animator.step(dt);
        idle.update(&metrics, dt, frame_start);

        let wan = inputs.wan.get();
        let printer = inputs.printer.get();

        let render_start = Instant::now();
        renderer.render(
            &mut current,
            &metrics,
            wan,
            &printer,
            &mut animator,
            &idle,
            frame_start,
            start.elapsed().as_secs_f64(),
        );
        perf.render_time += render_start.elapsed();
        perf.render_frames += 1;

        let plan = if first_frame {
            FramePlan::Full
        } else {
            differ.diff(&current, &previous)
        };

        let sent = match &plan {
            FramePlan::Unchanged => false,
            FramePlan::Full => {
                let spi_start = Instant::now();
                if let Err(e) = panel.push_full(&current) {
                    debug!("full-frame push aborted: {e:#}");
                }
                perf.spi_time += spi_start.elapsed();
                perf.bytes_sent += screen_area * 3;
                perf.last_dirty_rects = 1;
                perf.last_dirty_area = screen_area;
                true
            }
            FramePlan::Rects(rects) => {
                let spi_start = Instant::now();
                let mut dirty_area = 0;
                for r in rects {
                    if let Err(e) =
                        panel.update_rect(r.x, r.y, r.w, r.h, &current.px, current.width)
                    {
                        debug!("rect push aborted: {e:#}");
                    }
                    dirty_area += r.area();
                }
                perf.spi_time += spi_start.elapsed();
                perf.bytes_sent += dirty_area * 3;
                perf.last_dirty_rects = rects.len();
                perf.last_dirty_area = dirty_area;
                true
            }
        };

        if sent {
            std::mem::swap(&mut current, &mut previous);
            first_frame = false;
            perf.spi_frames += 1;
        }

        if anim_burst > 0 {
            anim_burst -= 1;
        }

        let target_fps = if idle.is_idle() && anim_burst == 0 {
            cfg.render.idle_fps.max(1)
        } else {
            cfg.render.target_fps.max(1)
        };
        let budget = Duration::from_millis(1000 / target_fps as u64);
        let elapsed = frame_start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }

        let log_elapsed = last_log.elapsed();
        if log_elapsed >= PERF_LOG_INTERVAL {
            let secs = log_elapsed.as_secs_f64();
            info!(
                render_fps = format!("{:.1}", perf.render_frames as f64 / secs),
                spi_fps = format!("{:.1}", perf.spi_frames as f64 / secs),
                bytes = perf.bytes_sent,
                dirty_rects = perf.last_dirty_rects,
                dirty_pct = format!(
                    "{:.1}",
                    100.0 * perf.last_dirty_area as f64 / screen_area as f64
                ),
                render_ms = format!("{:.1}", perf.render_time.as_secs_f64() * 1000.0),
                spi_ms = format!("{:.1}", perf.spi_time.as_secs_f64() * 1000.0),
                "panel perf"
            );
            perf = PerfCounters {
                last_dirty_rects: perf.last_dirty_rects,
                last_dirty_area: perf.last_dirty_area,
                ..PerfCounters::default()
            };
            last_log = Instant::now();
        }
    }

    panel.shutdown();
    info!("render loop stopped");
}
