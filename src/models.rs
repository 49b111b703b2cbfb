// Domain models shared between the pollers and the render loop

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// One atomic sampling of host telemetry. Built whole by the system poller
/// and published whole; consumers never observe fields from two different
/// sampling rounds.
///
/// Integer fields use `-1` for "unknown" (sensor missing, subprocess
/// timeout, service unreachable).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub mem_used_mb: u64,
    /// Degrees Celsius; 0.0 when no thermal zone reports a plausible value.
    pub temp_c: f64,
    pub net1_mbps: f64,
    pub net2_mbps: f64,
    pub uptime_s: u64,
    pub docker_running: i32,
    pub disk_pct: i32,
    pub wg_peers: i32,
    pub mc_online: i32,
    pub mc_max: i32,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            cpu_pct: 0.0,
            mem_pct: 0.0,
            mem_used_mb: 0,
            temp_c: 0.0,
            net1_mbps: 0.0,
            net2_mbps: 0.0,
            uptime_s: 0,
            docker_running: -1,
            disk_pct: -1,
            wg_peers: -1,
            mc_online: -1,
            mc_max: -1,
        }
    }
}

/// Stabilized WAN reachability classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WanStatus {
    Checking,
    Ok,
    Degraded,
    Down,
}

impl fmt::Display for WanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WanStatus::Checking => "CHECKING",
            WanStatus::Ok => "OK",
            WanStatus::Degraded => "DEGRADED",
            WanStatus::Down => "DOWN",
        };
        f.write_str(s)
    }
}

/// Decoded print preview image, shared immutably so the render loop can
/// keep a cheap handle while the printer poller rotates to a newer one.
#[derive(Debug)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Latest printer observation. `had_job` is sticky once a print has been
/// seen; `last_active` is the monotonic time of the last active state.
#[derive(Debug, Clone, Default)]
pub struct PrinterMetrics {
    pub state: String,
    pub filename: String,
    /// Completion fraction in [0, 1].
    pub progress: f64,
    pub elapsed_s: u64,
    /// Estimated seconds remaining; -1 when not yet reliable.
    pub eta_s: i64,
    pub active: bool,
    pub had_job: bool,
    pub last_active: Option<Instant>,
    pub thumb: Option<Arc<Thumbnail>>,
    pub thumb_relpath: String,
}

impl PrinterMetrics {
    /// The printer keeps the print view eligible while a job is running,
    /// or for a short grace window after the last active observation.
    pub fn print_eligible(&self, now: Instant, grace_s: u64) -> bool {
        if self.active {
            return true;
        }
        if !self.had_job {
            return false;
        }
        match self.last_active {
            Some(t) => now.saturating_duration_since(t).as_secs() < grace_s,
            None => false,
        }
    }
}
