// WAN reachability: default route + ping probes, stabilized over a window

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bus::StateCell;
use crate::models::WanStatus;

use super::run_with_timeout;

const CHECK_INTERVAL: Duration = Duration::from_secs(5);
const PING_TIMEOUT_S: u32 = 2;
const RTT_DEGRADED_MS: f64 = 200.0;
const WINDOW_SIZE: usize = 3;
const TARGETS: [&str; 2] = ["1.1.1.1", "8.8.8.8"];

static PING_RTT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=([0-9]+\.?[0-9]*) ms").expect("ping rtt regex"));

pub async fn run(cell: Arc<StateCell<WanStatus>>, cancel: CancellationToken) {
    let mut window = StatusWindow::new(WINDOW_SIZE);
    let mut tick = tokio::time::interval(CHECK_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }
        let raw = check_once().await;
        cell.set(window.push(raw));
    }
    debug!("wan poller stopped");
}

/// One raw classification: no default route or no reply from any target is
/// DOWN; a slow first reply is DEGRADED; otherwise OK.
async fn check_once() -> WanStatus {
    let has_route = std::fs::read_to_string("/proc/net/route")
        .map(|t| has_default_route(&t))
        .unwrap_or(false);
    if !has_route {
        return WanStatus::Down;
    }
    for target in TARGETS {
        if let Some(rtt_ms) = ping(target).await {
            return if rtt_ms > RTT_DEGRADED_MS {
                WanStatus::Degraded
            } else {
                WanStatus::Ok
            };
        }
    }
    WanStatus::Down
}

async fn ping(target: &str) -> Option<f64> {
    let timeout_arg = PING_TIMEOUT_S.to_string();
    let output = run_with_timeout(
        "ping",
        &["-c", "1", "-W", &timeout_arg, target],
        Duration::from_secs(PING_TIMEOUT_S as u64 + 1),
    )
    .await
    .ok()?;
    parse_ping_rtt(&output)
}

/// RTT in milliseconds out of iputils `time=12.3 ms` output.
pub fn parse_ping_rtt(output: &str) -> Option<f64> {
    PING_RTT_RE
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `/proc/net/route` lists a gateway route with destination 00000000.
pub fn has_default_route(route_table: &str) -> bool {
    const RTF_GATEWAY: u32 = 0x2;
    for line in route_table.lines().skip(1) {
        let mut fields = line.split_whitespace();
        let (Some(_iface), Some(dest), Some(_gw), Some(flags)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let flags = u32::from_str_radix(flags, 16).unwrap_or(0);
        if dest == "00000000" && flags & RTF_GATEWAY != 0 {
            return true;
        }
    }
    false
}

/// Sliding window of raw classifications. A single DOWN anywhere in the
/// window wins outright so outages surface immediately; otherwise the most
/// frequent recent observation is reported, which keeps one slow ping from
/// flapping the status.
#[derive(Debug)]
pub struct StatusWindow {
    ring: VecDeque<WanStatus>,
    cap: usize,
}

impl StatusWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            ring: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Record a raw observation and return the stabilized status.
    pub fn push(&mut self, raw: WanStatus) -> WanStatus {
        if self.ring.len() >= self.cap {
            self.ring.pop_front();
        }
        self.ring.push_back(raw);
        self.stabilized()
    }

    pub fn stabilized(&self) -> WanStatus {
        if self.ring.contains(&WanStatus::Down) {
            return WanStatus::Down;
        }
        if self.ring.len() < 2 {
            return self.ring.front().copied().unwrap_or(WanStatus::Checking);
        }
        let candidates = [WanStatus::Checking, WanStatus::Degraded, WanStatus::Ok];
        let mut best = WanStatus::Checking;
        let mut best_count = 0;
        for status in candidates {
            let count = self.ring.iter().filter(|&&s| s == status).count();
            if count > best_count {
                best = status;
                best_count = count;
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_detection() {
        let table = "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\n\
                     eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\n\
                     eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\n";
        assert!(has_default_route(table));

        let no_default = "Iface\tDestination\tGateway \tFlags\n\
                          eth0\t0001A8C0\t00000000\t0001\n";
        assert!(!has_default_route(no_default));
    }

    #[test]
    fn ping_rtt_parses() {
        let out = "64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=12.8 ms\n";
        assert_eq!(parse_ping_rtt(out), Some(12.8));
        assert_eq!(parse_ping_rtt("Request timeout"), None);
    }
}
