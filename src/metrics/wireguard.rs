// Active WireGuard peer count: wg-easy DB filter ∩ live handshake table

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::config::WireGuardConfig;

use super::run_with_timeout;

const WG_TIMEOUT: Duration = Duration::from_secs(5);

/// Counts peers with a recent handshake. The wg-easy SQLite database
/// restricts the count to peers that are enabled in its UI, so the panel
/// agrees with what the admin sees; when the database is unavailable the
/// handshake table is counted unfiltered.
#[derive(Debug)]
pub struct WireGuardPoller {
    cfg: WireGuardConfig,
    pool: Option<SqlitePool>,
}

impl WireGuardPoller {
    pub fn new(cfg: WireGuardConfig) -> Self {
        Self { cfg, pool: None }
    }

    pub async fn active_peers(&mut self) -> i32 {
        let enabled = self.enabled_pubkeys().await;
        let output = match run_with_timeout(
            "wg",
            &["show", &self.cfg.interface, "latest-handshakes"],
            WG_TIMEOUT,
        )
        .await
        {
            Ok(out) => out,
            Err(e) => {
                debug!("wg show failed: {e}");
                return -1;
            }
        };
        if output.trim().is_empty() {
            return 0;
        }
        let now_s = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        count_active(
            &parse_handshakes(&output),
            enabled.as_ref(),
            now_s,
            self.cfg.active_window_s as i64,
        )
    }

    /// Enabled public keys from the wg-easy database, connecting lazily
    /// and read-only. `None` (no filter) when the DB cannot be read.
    async fn enabled_pubkeys(&mut self) -> Option<HashSet<String>> {
        if self.pool.is_none() {
            if !Path::new(&self.cfg.db_path).exists() {
                return None;
            }
            let options = SqliteConnectOptions::new()
                .filename(&self.cfg.db_path)
                .read_only(true)
                .immutable(true);
            match SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
            {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    debug!("wg-easy db unavailable: {e}");
                    return None;
                }
            }
        }
        let pool = self.pool.as_ref()?;
        match sqlx::query("SELECT public_key FROM clients_table WHERE enabled = 1")
            .fetch_all(pool)
            .await
        {
            Ok(rows) => Some(
                rows.iter()
                    .filter_map(|r| r.try_get::<String, _>(0).ok())
                    .collect(),
            ),
            Err(e) => {
                debug!("wg-easy db query failed: {e}");
                None
            }
        }
    }
}

/// `wg show <if> latest-handshakes` lines: `<pubkey>\t<unix-ts>`.
pub fn parse_handshakes(output: &str) -> Vec<(String, i64)> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pubkey = parts.next()?;
            let ts = parts.next()?.parse().ok()?;
            Some((pubkey.to_string(), ts))
        })
        .collect()
}

/// Peers with a handshake inside the active window; peers absent from a
/// present enabled-set are skipped, as are peers that never shook hands.
pub fn count_active(
    handshakes: &[(String, i64)],
    enabled: Option<&HashSet<String>>,
    now_s: i64,
    window_s: i64,
) -> i32 {
    let mut count = 0;
    for (pubkey, ts) in handshakes {
        if *ts <= 0 {
            continue;
        }
        if let Some(filter) = enabled
            && !filter.is_empty()
            && !filter.contains(pubkey)
        {
            continue;
        }
        if now_s - ts <= window_s {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_lines_parse() {
        let out = "abc123=\t1700000000\nxyz789=\t0\n";
        let parsed = parse_handshakes(out);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], ("abc123=".to_string(), 1_700_000_000));
        assert_eq!(parsed[1].1, 0);
    }

    #[test]
    fn counting_respects_window_and_filter() {
        let handshakes = vec![
            ("a".to_string(), 1000),
            ("b".to_string(), 900),
            ("c".to_string(), 0),
        ];
        // No filter: a within window, b outside, c never shook hands.
        assert_eq!(count_active(&handshakes, None, 1060, 120), 1);
        // Filter excludes a.
        let only_b: HashSet<String> = ["b".to_string()].into();
        assert_eq!(count_active(&handshakes, Some(&only_b), 1060, 120), 0);
        // Empty filter behaves like no filter.
        let empty = HashSet::new();
        assert_eq!(count_active(&handshakes, Some(&empty), 1060, 120), 1);
    }
}
