// Moonraker printer poller: job state, ETA, preview thumbnail

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bus::StateCell;
use crate::config::PrinterConfig;
use crate::models::{PrinterMetrics, Thumbnail};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: StatusResult,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    status: StatusFields,
}

#[derive(Debug, Deserialize, Default)]
struct StatusFields {
    #[serde(default)]
    print_stats: PrintStats,
    #[serde(default)]
    virtual_sdcard: VirtualSdcard,
}

#[derive(Debug, Deserialize, Default)]
struct PrintStats {
    #[serde(default)]
    state: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    print_duration: f64,
}

#[derive(Debug, Deserialize, Default)]
struct VirtualSdcard {
    #[serde(default)]
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    result: MetadataResult,
}

#[derive(Debug, Deserialize)]
struct MetadataResult {
    #[serde(default)]
    thumbnails: Vec<ThumbnailDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailDescriptor {
    #[serde(default)]
    width: i64,
    #[serde(default)]
    height: i64,
    #[serde(default)]
    relative_path: String,
}

/// ETA becomes meaningful only once enough of the job has run to
/// extrapolate: progress above 3% and more than 5 s elapsed.
pub fn compute_eta(progress: f64, elapsed_s: f64) -> i64 {
    if progress > 0.03 && elapsed_s > 5.0 {
        let remaining = elapsed_s / progress - elapsed_s;
        if remaining > 0.0 {
            return remaining as i64;
        }
    }
    -1
}

/// Percent-encode a server file path, keeping `/` separators.
pub fn encode_path(path: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        match b {
            b'/' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                out.push('%');
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0x0F) as usize] as char);
            }
        }
    }
    out
}

/// The largest thumbnail by pixel area wins.
fn best_thumbnail(descriptors: &[ThumbnailDescriptor]) -> Option<&ThumbnailDescriptor> {
    descriptors
        .iter()
        .filter(|t| !t.relative_path.is_empty())
        .max_by_key(|t| t.width * t.height)
}

pub async fn run(cfg: PrinterConfig, cell: Arc<StateCell<PrinterMetrics>>, cancel: CancellationToken) {
    let client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("printer poller disabled, HTTP client failed to build: {e}");
            return;
        }
    };

    let mut poller = PrinterPoller {
        client,
        base_url: cfg.base_url.trim_end_matches('/').to_string(),
        cell,
        last_filename: String::new(),
        last_thumb_relpath: String::new(),
    };

    let mut tick = tokio::time::interval(Duration::from_millis(cfg.poll_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }
        if let Err(e) = poller.poll().await {
            debug!("printer poll failed: {e}");
        }
    }
    debug!("printer poller stopped");
}

struct PrinterPoller {
    client: reqwest::Client,
    base_url: String,
    cell: Arc<StateCell<PrinterMetrics>>,
    last_filename: String,
    last_thumb_relpath: String,
}

impl PrinterPoller {
    async fn poll(&mut self) -> Result<()> {
        let url = format!(
            "{}/printer/objects/query?print_stats&virtual_sdcard",
            self.base_url
        );
        let response: StatusResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("status request")?
            .error_for_status()
            .context("status response")?
            .json()
            .await
            .context("status json")?;

        let stats = response.result.status.print_stats;
        let progress = response.result.status.virtual_sdcard.progress;
        let active = stats.state == "printing" || stats.state == "paused";
        let eta = compute_eta(progress, stats.print_duration);
        let now = Instant::now();

        self.cell.update(|m| {
            m.state = stats.state.clone();
            m.filename = stats.filename.clone();
            m.progress = progress;
            m.elapsed_s = stats.print_duration.max(0.0) as u64;
            m.eta_s = eta;
            m.active = active;
            if active {
                m.had_job = true;
                m.last_active = Some(now);
            }
        });

        if !stats.filename.is_empty() && stats.filename != self.last_filename {
            self.last_filename = stats.filename.clone();
            if let Err(e) = self.refresh_thumbnail(&stats.filename).await {
                // Keep whatever preview we had.
                debug!("thumbnail refresh failed: {e}");
            }
        }
        Ok(())
    }

    /// On a filename change, pick the biggest advertised thumbnail and only
    /// re-download when its path actually changed. The decoded image is
    /// published with one atomic swap; a failed fetch or decode never
    /// clobbers the previous preview.
    async fn refresh_thumbnail(&mut self, filename: &str) -> Result<()> {
        let meta_url = format!("{}/server/files/metadata", self.base_url);
        let metadata: MetadataResponse = self
            .client
            .get(&meta_url)
            .query(&[("filename", filename)])
            .send()
            .await
            .context("metadata request")?
            .error_for_status()?
            .json()
            .await
            .context("metadata json")?;

        let Some(best) = best_thumbnail(&metadata.result.thumbnails) else {
            return Ok(());
        };
        if best.relative_path == self.last_thumb_relpath {
            return Ok(());
        }

        let thumb_url = format!(
            "{}/server/files/gcodes/{}",
            self.base_url,
            encode_path(&best.relative_path)
        );
        let bytes = self
            .client
            .get(&thumb_url)
            .timeout(Duration::from_secs(8))
            .send()
            .await
            .context("thumbnail request")?
            .error_for_status()?
            .bytes()
            .await
            .context("thumbnail body")?;

        let decoded = image::load_from_memory(&bytes)
            .context("decoding thumbnail")?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        anyhow::ensure!(width > 0 && height > 0, "empty thumbnail");

        let thumbnail = Arc::new(Thumbnail {
            width,
            height,
            rgba: decoded.into_raw(),
        });
        self.last_thumb_relpath = best.relative_path.clone();
        let relpath = best.relative_path.clone();
        self.cell.update(move |m| {
            m.thumb = Some(thumbnail);
            m.thumb_relpath = relpath;
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_requires_reliable_progress() {
        assert_eq!(compute_eta(0.5, 300.0), 300);
        assert_eq!(compute_eta(0.02, 1000.0), -1);
        assert_eq!(compute_eta(0.5, 4.0), -1);
        assert_eq!(compute_eta(0.03, 300.0), -1);
        assert_eq!(compute_eta(1.0, 600.0), -1);
    }

    #[test]
    fn path_encoding_keeps_separators() {
        assert_eq!(
            encode_path(".thumbs/part one-32x32.png"),
            ".thumbs/part%20one-32x32.png"
        );
        assert_eq!(encode_path("a/b~c_d-e.png"), "a/b~c_d-e.png");
    }

    #[test]
    fn biggest_thumbnail_wins() {
        let thumbs = vec![
            ThumbnailDescriptor {
                width: 32,
                height: 32,
                relative_path: "small.png".into(),
            },
            ThumbnailDescriptor {
                width: 300,
                height: 300,
                relative_path: "big.png".into(),
            },
            ThumbnailDescriptor {
                width: 400,
                height: 400,
                relative_path: String::new(),
            },
        ];
        assert_eq!(best_thumbnail(&thumbs).unwrap().relative_path, "big.png");
    }

    #[test]
    fn status_json_deserializes() {
        let body = r#"{"result":{"status":{
            "print_stats":{"state":"printing","filename":"benchy.gcode","print_duration":321.5},
            "virtual_sdcard":{"progress":0.42}}}}"#;
        let parsed: StatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.status.print_stats.state, "printing");
        assert!((parsed.result.status.virtual_sdcard.progress - 0.42).abs() < 1e-12);
    }
}
