// Minecraft RCON client for the online-player count

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use anyhow::{Result, bail, ensure};
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::RconConfig;

const TYPE_AUTH: i32 = 3;
const TYPE_COMMAND: i32 = 2;
const MAX_FRAME_LEN: i32 = 4096;

static PLAYERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"There are (\d+) of a max of (\d+) players online").expect("players regex")
});

/// RCON frame: `{i32 length; i32 id; i32 type; payload; 2 nul bytes}`,
/// little-endian, length counting everything after itself.
pub fn encode_packet(id: i32, ptype: i32, payload: &str) -> Vec<u8> {
    let len = (4 + 4 + payload.len() + 2) as i32;
    let mut buf = Vec::with_capacity(4 + len as usize);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&ptype.to_le_bytes());
    buf.extend_from_slice(payload.as_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

/// Split a received frame body (everything after the length word) into
/// id, type and payload.
pub fn decode_body(body: &[u8]) -> Result<(i32, i32, String)> {
    ensure!(body.len() >= 10, "rcon frame too short: {}", body.len());
    let id = i32::from_le_bytes([body[0], body[1], body[2], body[3]]);
    let ptype = i32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let payload = String::from_utf8_lossy(&body[8..body.len() - 2]).into_owned();
    Ok((id, ptype, payload))
}

pub fn parse_players(response: &str) -> Option<(i32, i32)> {
    let caps = PLAYERS_RE.captures(response)?;
    let online = caps.get(1)?.as_str().parse().ok()?;
    let max = caps.get(2)?.as_str().parse().ok()?;
    Some((online, max))
}

/// Interval-cached player-count poller. Anything going wrong during a poll
/// (connect, auth, protocol, parse) caches `(-1, -1)` and the next due
/// cycle retries from scratch.
#[derive(Debug)]
pub struct RconPoller {
    cfg: RconConfig,
    last_poll: Option<Instant>,
    cached: (i32, i32),
}

impl RconPoller {
    pub fn new(cfg: RconConfig) -> Self {
        Self {
            cfg,
            last_poll: None,
            cached: (-1, -1),
        }
    }

    pub async fn players(&mut self) -> (i32, i32) {
        if self.cfg.password.is_empty() {
            return (-1, -1);
        }
        let now = Instant::now();
        if let Some(last) = self.last_poll
            && now.duration_since(last) < Duration::from_millis(self.cfg.interval_ms)
        {
            return self.cached;
        }
        self.last_poll = Some(now);

        self.cached = match self.query().await {
            Ok(counts) => counts,
            Err(e) => {
                debug!("rcon poll failed: {e}");
                (-1, -1)
            }
        };
        self.cached
    }

    async fn query(&self) -> Result<(i32, i32)> {
        let timeout = Duration::from_millis(self.cfg.timeout_ms);
        let addr = (self.cfg.host.as_str(), self.cfg.port);
        let mut stream = tokio::time::timeout(timeout, TcpStream::connect(addr)).await??;

        write_frame(&mut stream, encode_packet(1, TYPE_AUTH, &self.cfg.password), timeout).await?;
        let (id, _ptype, _payload) = read_frame(&mut stream, timeout).await?;
        ensure!(id != -1, "rcon auth rejected");

        write_frame(&mut stream, encode_packet(2, TYPE_COMMAND, "list"), timeout).await?;
        let (_id, _ptype, payload) = read_frame(&mut stream, timeout).await?;

        match parse_players(&payload) {
            Some(counts) => Ok(counts),
            None => bail!("unrecognized list response: {payload:?}"),
        }
    }
}

async fn write_frame(stream: &mut TcpStream, frame: Vec<u8>, timeout: Duration) -> Result<()> {
    tokio::time::timeout(timeout, stream.write_all(&frame)).await??;
    Ok(())
}

async fn read_frame(stream: &mut TcpStream, timeout: Duration) -> Result<(i32, i32, String)> {
    let mut len_buf = [0u8; 4];
    tokio::time::timeout(timeout, stream.read_exact(&mut len_buf)).await??;
    let len = i32::from_le_bytes(len_buf);
    // Malformed or oversized frames: drop the connection.
    ensure!((10..=MAX_FRAME_LEN).contains(&len), "bad rcon frame length {len}");
    let mut body = vec![0u8; len as usize];
    tokio::time::timeout(timeout, stream.read_exact(&mut body)).await??;
    decode_body(&body)
}
