// Fast-cadence host metrics: /proc, /sys, docker, disk, wg, game server

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bollard::Docker;
use bollard::container::ListContainersOptions;
use sysinfo::Disks;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bus::SnapshotSlot;
use crate::config::AppConfig;
use crate::models::MetricsSnapshot;

use super::rcon::RconPoller;
use super::run_with_timeout;
use super::wireguard::WireGuardPoller;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(
    cfg: AppConfig,
    slot: Arc<SnapshotSlot<MetricsSnapshot>>,
    cancel: CancellationToken,
) {
    let mut poller = SystemPoller::new(&cfg);
    let mut tick = tokio::time::interval(POLL_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }
        let snapshot = poller.sample().await;
        slot.publish(snapshot);
    }
    debug!("system poller stopped");
}

struct SystemPoller {
    if1: String,
    if2: String,
    cpu_prev: Option<CpuTimes>,
    net_prev: HashMap<String, (u64, Instant)>,
    disks: Disks,
    docker: Option<Docker>,
    wireguard: WireGuardPoller,
    rcon: RconPoller,
}

impl SystemPoller {
    fn new(cfg: &AppConfig) -> Self {
        let docker = match Docker::connect_with_unix_defaults() {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("docker unavailable, container count disabled: {e}");
                None
            }
        };
        Self {
            if1: cfg.net.if1.clone(),
            if2: cfg.net.if2.clone(),
            cpu_prev: None,
            net_prev: HashMap::new(),
            disks: Disks::new_with_refreshed_list(),
            docker,
            wireguard: WireGuardPoller::new(cfg.wg.clone()),
            rcon: RconPoller::new(cfg.rcon.clone()),
        }
    }

    /// Gather one complete snapshot. Every field degrades independently;
    /// a failed probe leaves its sentinel and never aborts the round.
    async fn sample(&mut self) -> MetricsSnapshot {
        let mut snap = MetricsSnapshot::default();

        snap.cpu_pct = self.sample_cpu();
        (snap.mem_pct, snap.mem_used_mb) = sample_memory();
        snap.temp_c = sample_temperature();
        snap.net1_mbps = self.sample_net(&self.if1.clone()).await;
        snap.net2_mbps = self.sample_net(&self.if2.clone()).await;
        snap.uptime_s = sample_uptime();
        snap.docker_running = self.docker_count().await;
        snap.disk_pct = self.disk_percent();
        snap.wg_peers = self.wireguard.active_peers().await;
        (snap.mc_online, snap.mc_max) = self.rcon.players().await;

        snap
    }

    /// Busy fraction over the delta since the previous read of the
    /// aggregate `cpu` line. First read establishes the baseline.
    fn sample_cpu(&mut self) -> f64 {
        let Ok(stat) = std::fs::read_to_string("/proc/stat") else {
            return 0.0;
        };
        let Some(cur) = stat.lines().next().and_then(parse_cpu_line) else {
            return 0.0;
        };
        let usage = match self.cpu_prev {
            Some(prev) => cpu_usage_pct(prev, cur),
            None => 0.0,
        };
        self.cpu_prev = Some(cur);
        usage
    }

    /// Interface throughput from the sysfs byte counters. An `ethtool -S`
    /// fallback is attempted only when the sysfs read fails (some USB NICs
    /// do not expose statistics); both paths finish well inside the poll
    /// period.
    async fn sample_net(&mut self, interface: &str) -> f64 {
        let bytes = match read_sysfs_net_bytes(interface) {
            Some(b) => Some(b),
            None => match run_with_timeout("ethtool", &["-S", interface], SUBPROCESS_TIMEOUT).await
            {
                Ok(out) => parse_ethtool_octets(&out),
                Err(e) => {
                    debug!("ethtool fallback failed for {interface}: {e}");
                    None
                }
            },
        };
        let Some(current) = bytes else {
            return 0.0;
        };

        let now = Instant::now();
        let speed = match self.net_prev.get(interface) {
            Some(&(prev_bytes, prev_t)) => {
                let dt = now.duration_since(prev_t).as_secs_f64();
                if dt > 0.0 {
                    let delta = current.saturating_sub(prev_bytes);
                    (delta as f64 * 8.0) / (dt * 1_000_000.0)
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.net_prev.insert(interface.to_string(), (current, now));
        speed
    }

    async fn docker_count(&mut self) -> i32 {
        let Some(docker) = &self.docker else {
            return -1;
        };
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);
        let options = ListContainersOptions {
            all: false,
            filters,
            ..Default::default()
        };
        match tokio::time::timeout(SUBPROCESS_TIMEOUT, docker.list_containers(Some(options))).await
        {
            Ok(Ok(containers)) => containers.len() as i32,
            Ok(Err(e)) => {
                debug!("docker list_containers failed: {e}");
                -1
            }
            Err(_) => {
                debug!("docker list_containers timed out");
                -1
            }
        }
    }

    fn disk_percent(&mut self) -> i32 {
        self.disks.refresh(false);
        for disk in self.disks.list() {
            if disk.mount_point() == std::path::Path::new("/") {
                let total = disk.total_space();
                if total == 0 {
                    return -1;
                }
                let used = total.saturating_sub(disk.available_space());
                return ((used * 100) / total) as i32;
            }
        }
        -1
    }
}

/// Aggregate jiffies from a `/proc/stat` cpu line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub total: u64,
    pub idle: u64,
}

/// Parse the aggregate `cpu` line: user nice system idle iowait irq
/// softirq steal. Idle time includes iowait.
pub fn parse_cpu_line(line: &str) -> Option<CpuTimes> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "cpu" {
        return None;
    }
    let mut fields = [0u64; 8];
    for f in fields.iter_mut() {
        *f = parts.next()?.parse().ok()?;
    }
    let [user, nice, system, idle, iowait, irq, softirq, steal] = fields;
    let idle_all = idle + iowait;
    Some(CpuTimes {
        total: user + nice + system + idle_all + irq + softirq + steal,
        idle: idle_all,
    })
}

pub fn cpu_usage_pct(prev: CpuTimes, cur: CpuTimes) -> f64 {
    let total_delta = cur.total.saturating_sub(prev.total) as f64;
    if total_delta <= 0.0 {
        return 0.0;
    }
    let idle_delta = cur.idle.saturating_sub(prev.idle) as f64;
    100.0 * (1.0 - idle_delta / total_delta)
}

/// MemTotal/MemAvailable (kB) → (percent used, MiB used).
pub fn parse_meminfo(content: &str) -> Option<(f64, u64)> {
    let mut total_kb = 0u64;
    let mut available_kb = 0u64;
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemTotal:") => total_kb = parts.next()?.parse().ok()?,
            Some("MemAvailable:") => available_kb = parts.next()?.parse().ok()?,
            _ => {}
        }
    }
    if total_kb == 0 {
        return None;
    }
    let used_kb = total_kb.saturating_sub(available_kb);
    Some((
        used_kb as f64 / total_kb as f64 * 100.0,
        used_kb / 1024,
    ))
}

fn sample_memory() -> (f64, u64) {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|c| parse_meminfo(&c))
        .unwrap_or((0.0, 0))
}

/// Probe thermal_zone0..4 until a plausible value shows up. Sensors that
/// report 0 or wild values (disconnected zones) are skipped.
fn sample_temperature() -> f64 {
    for zone in 0..5 {
        let path = format!("/sys/class/thermal/thermal_zone{zone}/temp");
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(milli_c) = content.trim().parse::<i64>()
        {
            let temp_c = milli_c as f64 / 1000.0;
            if temp_c > 20.0 && temp_c < 120.0 {
                return temp_c;
            }
        }
    }
    0.0
}

fn read_sysfs_net_bytes(interface: &str) -> Option<u64> {
    let read = |stat: &str| -> Option<u64> {
        std::fs::read_to_string(format!("/sys/class/net/{interface}/statistics/{stat}"))
            .ok()?
            .trim()
            .parse()
            .ok()
    };
    Some(read("rx_bytes")? + read("tx_bytes")?)
}

/// Sum rx_octets + tx_octets out of `ethtool -S` output.
pub fn parse_ethtool_octets(output: &str) -> Option<u64> {
    let mut rx = None;
    let mut tx = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(v) = line.strip_prefix("rx_octets:") {
            rx = v.trim().parse().ok();
        } else if let Some(v) = line.strip_prefix("tx_octets:") {
            tx = v.trim().parse().ok();
        }
    }
    match (rx, tx) {
        (None, None) => None,
        (rx, tx) => Some(rx.unwrap_or(0) + tx.unwrap_or(0)),
    }
}

fn sample_uptime() -> u64 {
    std::fs::read_to_string("/proc/uptime")
        .ok()
        .and_then(|c| parse_uptime(&c))
        .unwrap_or(0)
}

pub fn parse_uptime(content: &str) -> Option<u64> {
    content
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .map(|s| s as u64)
}
