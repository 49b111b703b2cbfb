// Environment-variable configuration, read once at startup

use anyhow::ensure;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub differ: DifferConfig,
    pub spi: SpiConfig,
    pub ui: UiConfig,
    pub net: NetConfig,
    pub spark: SparklineConfig,
    pub wg: WireGuardConfig,
    pub rcon: RconConfig,
    pub printer: PrinterConfig,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub target_fps: u32,
    pub idle_fps: u32,
    /// Frames of forced rendering after a new snapshot arrives.
    pub anim_burst_frames: u32,
}

#[derive(Debug, Clone)]
pub struct DifferConfig {
    /// Differ tile edge in pixels.
    pub tile: usize,
    /// Rectangle cap before escalating to a full-frame push.
    pub max_rects: usize,
    /// Dirty-area ratio cap before escalating to a full-frame push.
    pub full_frame_threshold: f64,
}

#[derive(Debug, Clone)]
pub struct SpiConfig {
    pub device: String,
    /// Clock in Hz, clamped to the panel maximum.
    pub speed_hz: u32,
    /// Transfer chunk in bytes; normalized to a multiple of 3, minimum 3.
    pub chunk_bytes: usize,
    /// Sleep between chunks, microseconds.
    pub throttle_us: u64,
    /// Panel RAM offsets added to both window endpoints.
    pub offset_x: u16,
    pub offset_y: u16,
    pub dc_pin: u64,
    pub rst_pin: u64,
    pub bl_pin: u64,
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub theme: String,
    pub font_path: String,
    pub grid: bool,
    pub band: bool,
    pub footer: bool,
    /// Header title override; hostname when empty.
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct NetConfig {
    pub if1: String,
    pub if2: String,
    pub autoscale: bool,
    pub autoscale_pctl: f64,
    pub autoscale_min: f64,
    pub autoscale_max: f64,
    pub autoscale_ema: f64,
}

#[derive(Debug, Clone)]
pub struct SparklineConfig {
    pub smooth: bool,
    pub smooth_alpha: f64,
    pub pulse: bool,
    pub peak_highlight: bool,
    pub gradient_line: bool,
    pub particles: bool,
    pub enhanced_fill: bool,
    pub dynamic_width: bool,
    pub baseline_shimmer: bool,
    pub shadow: bool,
    pub color_zones: bool,
    pub smooth_transitions: bool,
}

#[derive(Debug, Clone)]
pub struct WireGuardConfig {
    pub interface: String,
    pub db_path: String,
    /// A peer counts as active when its last handshake is this recent.
    pub active_window_s: u64,
}

#[derive(Debug, Clone)]
pub struct RconConfig {
    pub host: String,
    pub port: u16,
    /// Empty password disables the game-server poll entirely.
    pub password: String,
    pub timeout_ms: u64,
    /// Minimum interval between live polls; cached in between.
    pub interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Moonraker base URL; empty disables the printer poller.
    pub base_url: String,
    pub poll_ms: u64,
}

pub const SPI_SPEED_HZ_MAX: u32 = 24_000_000;

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup (e.g. a map in tests).
    pub fn load_with(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self {
            render: RenderConfig {
                target_fps: int(&get, "TARGET_FPS", 5),
                idle_fps: int(&get, "IDLE_FPS", 3),
                anim_burst_frames: int(&get, "ANIM_BURST_FRAMES", 5),
            },
            differ: DifferConfig {
                tile: int(&get, "DIRTY_TILE", 16),
                max_rects: int(&get, "DIRTY_MAX_RECTS", 8),
                full_frame_threshold: float(&get, "FULL_FRAME_THRESHOLD", 0.6),
            },
            spi: SpiConfig {
                device: string(&get, "SPI_DEV", "/dev/spidev0.0"),
                speed_hz: int::<u32>(&get, "SPI_SPEED_HZ", 16_000_000).min(SPI_SPEED_HZ_MAX),
                chunk_bytes: normalize_chunk(int(&get, "SPI_CHUNK", 1024)),
                throttle_us: int(&get, "SPI_THROTTLE_US", 0),
                offset_x: int(&get, "OFFSET_X", 0),
                offset_y: int(&get, "OFFSET_Y", 0),
                dc_pin: int(&get, "DC_PIN", 25),
                rst_pin: int(&get, "RST_PIN", 24),
                bl_pin: int(&get, "BL_PIN", 18),
            },
            ui: UiConfig {
                theme: string(&get, "THEME", "neutral"),
                font_path: string(
                    &get,
                    "FONT",
                    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
                ),
                grid: boolean(&get, "GRID", false),
                band: boolean(&get, "BAND", false),
                footer: boolean(&get, "FOOTER", false),
                title: string(&get, "TITLE", ""),
            },
            net: NetConfig {
                if1: string(&get, "NET_IF1", "eth0"),
                if2: string(&get, "NET_IF2", "eth1"),
                autoscale: boolean(&get, "NET_AUTOSCALE", false),
                autoscale_pctl: float(&get, "NET_AUTOSCALE_PCTL", 95.0),
                autoscale_min: float(&get, "NET_AUTOSCALE_MIN", 5.0),
                autoscale_max: float(&get, "NET_AUTOSCALE_MAX", 2500.0),
                autoscale_ema: float(&get, "NET_AUTOSCALE_EMA", 0.15),
            },
            spark: SparklineConfig {
                smooth: boolean(&get, "SPARKLINE_SMOOTH", true),
                smooth_alpha: float(&get, "SPARKLINE_SMOOTH_ALPHA", 0.3),
                pulse: boolean(&get, "SPARKLINE_PULSE", true),
                peak_highlight: boolean(&get, "SPARKLINE_PEAK_HIGHLIGHT", true),
                gradient_line: boolean(&get, "SPARKLINE_GRADIENT_LINE", true),
                particles: boolean(&get, "SPARKLINE_PARTICLES", false),
                enhanced_fill: boolean(&get, "SPARKLINE_ENHANCED_FILL", true),
                dynamic_width: boolean(&get, "SPARKLINE_DYNAMIC_WIDTH", true),
                baseline_shimmer: boolean(&get, "SPARKLINE_BASELINE_SHIMMER", false),
                shadow: boolean(&get, "SPARKLINE_SHADOW", true),
                color_zones: boolean(&get, "SPARKLINE_COLOR_ZONES", false),
                smooth_transitions: boolean(&get, "SPARKLINE_SMOOTH_TRANSITIONS", true),
            },
            wg: WireGuardConfig {
                interface: string(&get, "WG_IF", "wg0"),
                db_path: string(&get, "WG_DB", "/etc/wireguard/wg-easy.db"),
                active_window_s: int(&get, "WG_ACTIVE_SEC", 120),
            },
            rcon: RconConfig {
                host: string(&get, "MC_RCON_HOST", "127.0.0.1"),
                port: int(&get, "MC_RCON_PORT", 25575),
                password: string(&get, "MC_RCON_PASS", ""),
                timeout_ms: int(&get, "MC_RCON_TIMEOUT_MS", 1500),
                interval_ms: int(&get, "MC_RCON_INTERVAL_MS", 2000),
            },
            printer: PrinterConfig {
                base_url: string(&get, "PRINTER_URL", "http://127.0.0.1:7125"),
                poll_ms: int(&get, "PRINTER_POLL_MS", 5000),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.render.target_fps > 0,
            "TARGET_FPS must be > 0, got {}",
            self.render.target_fps
        );
        ensure!(
            self.render.idle_fps > 0,
            "IDLE_FPS must be > 0, got {}",
            self.render.idle_fps
        );
        ensure!(
            self.differ.tile > 0,
            "DIRTY_TILE must be > 0, got {}",
            self.differ.tile
        );
        ensure!(
            self.differ.max_rects > 0,
            "DIRTY_MAX_RECTS must be > 0, got {}",
            self.differ.max_rects
        );
        ensure!(
            self.differ.full_frame_threshold > 0.0 && self.differ.full_frame_threshold <= 1.0,
            "FULL_FRAME_THRESHOLD must be in (0, 1], got {}",
            self.differ.full_frame_threshold
        );
        ensure!(
            self.spi.speed_hz > 0,
            "SPI_SPEED_HZ must be > 0, got {}",
            self.spi.speed_hz
        );
        ensure!(
            (0.0..=100.0).contains(&self.net.autoscale_pctl),
            "NET_AUTOSCALE_PCTL must be in [0, 100], got {}",
            self.net.autoscale_pctl
        );
        ensure!(
            self.net.autoscale_min <= self.net.autoscale_max,
            "NET_AUTOSCALE_MIN {} must not exceed NET_AUTOSCALE_MAX {}",
            self.net.autoscale_min,
            self.net.autoscale_max
        );
        ensure!(
            self.net.autoscale_ema > 0.0 && self.net.autoscale_ema <= 1.0,
            "NET_AUTOSCALE_EMA must be in (0, 1], got {}",
            self.net.autoscale_ema
        );
        ensure!(
            self.spark.smooth_alpha > 0.0 && self.spark.smooth_alpha <= 1.0,
            "SPARKLINE_SMOOTH_ALPHA must be in (0, 1], got {}",
            self.spark.smooth_alpha
        );
        ensure!(
            self.printer.poll_ms > 0,
            "PRINTER_POLL_MS must be > 0, got {}",
            self.printer.poll_ms
        );
        ensure!(
            self.rcon.interval_ms > 0,
            "MC_RCON_INTERVAL_MS must be > 0, got {}",
            self.rcon.interval_ms
        );
        Ok(())
    }
}

/// Chunks are whole pixels on the wire: a multiple of 3 bytes, at least one
/// pixel.
fn normalize_chunk(bytes: usize) -> usize {
    let bytes = bytes.max(3);
    let bytes = bytes - bytes % 3;
    bytes.max(3)
}

fn string(get: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    get(name).unwrap_or_else(|| default.to_string())
}

fn int<T: std::str::FromStr + Copy>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    get(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn float(get: &impl Fn(&str) -> Option<String>, name: &str, default: f64) -> f64 {
    get(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn boolean(get: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    match get(name).as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}
