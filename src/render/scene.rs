// Scene layouts: main dashboard, print view, header/footer chrome

use std::time::Instant;

use crate::config::{AppConfig, NetConfig, SparklineConfig, UiConfig};
use crate::models::{MetricsSnapshot, PrinterMetrics, WanStatus};

use super::animation::AnimationEngine;
use super::color::{self, Color, rgb};
use super::fb::Frame;
use super::gauge;
use super::history::{Ema, HistoryRing, capacity_for_width};
use super::idle::IdleController;
use super::spark;
use super::text::TextPainter;
use super::theme::{Theme, thresholds};

/// Seconds a finished/paused printer keeps the print view eligible.
pub const PRINT_GRACE_S: u64 = 60;
const MAIN_DURATION_S: u64 = 180;
const PRINT_DURATION_S: u64 = 30;

mod layout {
    pub const HEADER_HEIGHT: i32 = 42;
    pub const FOOTER_HEIGHT: i32 = 28;
    pub const MARGIN: i32 = 12;
    pub const GAP: i32 = 10;
    pub const LEFT_PANEL_WIDTH: i32 = 310;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    Main,
    Print,
}

/// Alternates the dashboard between the main and print views on fixed
/// durations while the printer is print-eligible; otherwise pins Main.
/// A rising eligibility edge always starts in Main.
#[derive(Debug)]
pub struct ScreenScheduler {
    mode: ScreenMode,
    last_switch: Option<Instant>,
    was_eligible: bool,
}

impl ScreenScheduler {
    pub fn new() -> Self {
        Self {
            mode: ScreenMode::Main,
            last_switch: None,
            was_eligible: false,
        }
    }

    pub fn update(&mut self, now: Instant, eligible: bool) -> ScreenMode {
        if !eligible || !self.was_eligible {
            self.mode = ScreenMode::Main;
            self.last_switch = Some(now);
        } else {
            let since = self.last_switch.get_or_insert(now);
            let limit = match self.mode {
                ScreenMode::Main => MAIN_DURATION_S,
                ScreenMode::Print => PRINT_DURATION_S,
            };
            if now.saturating_duration_since(*since).as_secs() >= limit {
                self.mode = match self.mode {
                    ScreenMode::Main => ScreenMode::Print,
                    ScreenMode::Print => ScreenMode::Main,
                };
                self.last_switch = Some(now);
            }
        }
        self.was_eligible = eligible;
        self.mode
    }
}

impl Default for ScreenScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentile-based display ceiling for the network graphs, EMA-smoothed so
/// the scale does not jump between frames.
#[derive(Debug)]
pub struct NetScale {
    pctl: f64,
    min: f64,
    max: f64,
    ema: f64,
    smooth_max: f64,
    scratch: Vec<f64>,
}

impl NetScale {
    pub fn new(cfg: &NetConfig) -> Self {
        Self {
            pctl: cfg.autoscale_pctl,
            min: cfg.autoscale_min,
            max: cfg.autoscale_max,
            ema: cfg.autoscale_ema,
            smooth_max: 0.0,
            scratch: Vec::new(),
        }
    }

    pub fn compute(&mut self, history: &HistoryRing) -> f64 {
        if history.is_empty() {
            return self.max;
        }
        self.scratch.clear();
        self.scratch.extend(history.iter());
        self.scratch.sort_by(|a, b| a.total_cmp(b));
        let p = (self.pctl.clamp(0.0, 100.0)) / 100.0;
        let idx = ((p * (self.scratch.len() - 1) as f64).round() as usize)
            .min(self.scratch.len() - 1);
        let raw = self.scratch[idx].clamp(self.min, self.max);
        if self.smooth_max <= 0.0 {
            self.smooth_max = raw;
        } else {
            self.smooth_max = self.smooth_max * (1.0 - self.ema) + raw * self.ema;
        }
        self.smooth_max = self.smooth_max.clamp(self.min, self.max);
        self.smooth_max
    }
}

pub fn format_net(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.1}G", mbps / 1000.0)
    } else if mbps >= 1.0 {
        format!("{:.0}M", mbps)
    } else {
        format!("{:.1}M", mbps)
    }
}

pub fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let rem_m = minutes % 60;
    if hours < 24 {
        return format!("{hours}h {rem_m}m");
    }
    format!("{}d {}h", hours / 24, hours % 24)
}

pub fn format_duration_short(seconds: i64) -> String {
    if seconds < 0 {
        return "--".to_string();
    }
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

struct GraphPanelSpec<'a> {
    title: &'a str,
    values: String,
    subtitle: &'a str,
    label_a: &'a str,
    label_b: &'a str,
    series_a: &'a HistoryRing,
    series_b: &'a HistoryRing,
    min_val: f64,
    max_val: f64,
    color_a: Color,
    color_b: Color,
}

/// Owns the per-frame scene state: theme, font, chart histories, ticker,
/// auto-scale and the screen scheduler. Stateless with respect to the
/// frame being drawn; all pixel output goes through `render`.
pub struct Renderer {
    theme: Theme,
    ui: UiConfig,
    spark_cfg: SparklineConfig,
    net_autoscale: bool,
    text: TextPainter,

    hist_cpu: HistoryRing,
    hist_temp: HistoryRing,
    hist_net1: HistoryRing,
    hist_net2: HistoryRing,
    net1_ema: Ema,
    net2_ema: Ema,

    ticker_text: String,
    ticker_offset: f32,
    ticker_speed: f32,

    net1_scale: NetScale,
    net2_scale: NetScale,
    scheduler: ScreenScheduler,
    title: String,

    idle_t: f32,
}

impl Renderer {
    pub fn new(cfg: &AppConfig, frame_width: usize) -> Self {
        let cap = capacity_for_width(frame_width);
        let title = if cfg.ui.title.is_empty() {
            sysinfo::System::host_name().unwrap_or_else(|| "NAS Dashboard".to_string())
        } else {
            cfg.ui.title.clone()
        };
        Self {
            theme: Theme::by_name(&cfg.ui.theme),
            ui: cfg.ui.clone(),
            spark_cfg: cfg.spark.clone(),
            net_autoscale: cfg.net.autoscale,
            text: TextPainter::load(&cfg.ui.font_path),
            hist_cpu: HistoryRing::new(cap),
            hist_temp: HistoryRing::new(cap),
            hist_net1: HistoryRing::new(cap),
            hist_net2: HistoryRing::new(cap),
            net1_ema: Ema::new(cfg.spark.smooth_alpha),
            net2_ema: Ema::new(cfg.spark.smooth_alpha),
            ticker_text: String::new(),
            ticker_offset: 0.0,
            ticker_speed: 1.0,
            net1_scale: NetScale::new(&cfg.net),
            net2_scale: NetScale::new(&cfg.net),
            scheduler: ScreenScheduler::new(),
            title,
            idle_t: 0.0,
        }
    }

    /// Current footer ticker line.
    pub fn ticker_text(&self) -> &str {
        &self.ticker_text
    }

    /// Push the accepted snapshot into the chart histories. Network
    /// channels are EMA-smoothed when enabled; CPU and temperature go in
    /// raw.
    pub fn update_histories(&mut self, snapshot: &MetricsSnapshot) {
        self.hist_cpu.push(snapshot.cpu_pct);
        self.hist_temp.push(snapshot.temp_c);
        let (net1, net2) = if self.spark_cfg.smooth {
            (
                self.net1_ema.apply(snapshot.net1_mbps),
                self.net2_ema.apply(snapshot.net2_mbps),
            )
        } else {
            (snapshot.net1_mbps, snapshot.net2_mbps)
        };
        self.hist_net1.push(net1);
        self.hist_net2.push(net2);
    }

    pub fn update_ticker(&mut self, snapshot: &MetricsSnapshot, wan: WanStatus) {
        let wg = if snapshot.wg_peers >= 0 {
            format!("WG {}", snapshot.wg_peers)
        } else {
            "WG -".to_string()
        };
        let docker = if snapshot.docker_running >= 0 {
            format!("Docker {}", snapshot.docker_running)
        } else {
            "Docker -".to_string()
        };
        let disk = if snapshot.disk_pct >= 0 {
            format!("Disk {}%", snapshot.disk_pct)
        } else {
            "Disk -".to_string()
        };
        self.ticker_text = format!(
            "WAN {wan} | {wg} | NET1 {} | NET2 {} | {docker} | {disk}",
            format_net(snapshot.net1_mbps),
            format_net(snapshot.net2_mbps),
        );
    }

    /// Idle dimming: colors slide toward a darker copy as the transition
    /// progress approaches 1.
    fn dim(&self, c: Color) -> Color {
        color::interpolate(c, color::scale(c, 0.6), self.idle_t)
    }

    fn state_color(&self, value: f64, key: &str) -> Color {
        let Some(t) = thresholds(key) else {
            return self.theme.state_low;
        };
        if value < t[0] {
            rgb(0, 255, 80)
        } else if value < t[1] {
            self.theme.state_medium
        } else {
            self.theme.state_high
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        frame: &mut Frame,
        metrics: &MetricsSnapshot,
        wan: WanStatus,
        printer: &PrinterMetrics,
        animator: &mut AnimationEngine,
        idle: &IdleController,
        now: Instant,
        time_sec: f64,
    ) {
        self.idle_t = idle.transition_progress() as f32;
        let bg_top = color::interpolate(
            self.theme.bg_top_active,
            self.theme.bg_top_idle,
            self.idle_t,
        );
        frame.fill(bg_top);

        if self.ui.band {
            let bg_bottom = color::interpolate(
                self.theme.bg_bottom_active,
                self.theme.bg_bottom_idle,
                self.idle_t,
            );
            frame.v_gradient(
                0,
                0,
                frame.width as i32,
                layout::HEADER_HEIGHT,
                self.theme.band_color,
                bg_bottom,
            );
        }
        if self.ui.grid {
            let grid_color = color::scale(self.theme.grid_color, 0.5);
            frame.grid(
                0,
                layout::HEADER_HEIGHT,
                frame.width as i32,
                frame.height as i32 - layout::HEADER_HEIGHT,
                24,
                0,
                0,
                grid_color,
            );
        }

        let eligible = printer.print_eligible(now, PRINT_GRACE_S);
        if self.scheduler.update(now, eligible) == ScreenMode::Print && eligible {
            self.draw_print_screen(frame, printer, time_sec);
            return;
        }

        let width = frame.width as i32;
        let height = frame.height as i32;
        let footer_h = if self.ui.footer { layout::FOOTER_HEIGHT } else { 0 };
        let margin = layout::MARGIN;
        let gap = layout::GAP;
        let left_w = layout::LEFT_PANEL_WIDTH;
        let right_w = width - 2 * margin - gap - left_w;

        let content_y0 = layout::HEADER_HEIGHT + 10;
        let content_y1 = height - footer_h - 8;
        let graph_h = (content_y1 - content_y0 - gap) / 2;

        let cpu = animator.get("cpu", metrics.cpu_pct);
        let temp = animator.get("temp", metrics.temp_c);
        let net1 = animator.get("net1", metrics.net1_mbps);
        let net2 = animator.get("net2", metrics.net2_mbps);

        // Fixed series palette, independent of state thresholds.
        let series_net1 = self.dim(rgb(0, 210, 255));
        let series_net2 = self.dim(rgb(255, 220, 0));
        let series_cpu = self.dim(rgb(0, 255, 80));
        let series_temp = self.dim(rgb(255, 140, 80));

        self.draw_header(frame, 0, 0, width, layout::HEADER_HEIGHT, metrics, wan);

        let net_hist_max = if self.net_autoscale {
            let n1 = self.net1_scale.compute(&self.hist_net1);
            let n2 = self.net2_scale.compute(&self.hist_net2);
            n1.max(n2)
        } else {
            2500.0
        };

        let net_values = format!("N1 {}  N2 {}", format_net(net1), format_net(net2));
        let net_spec = GraphPanelSpec {
            title: "Network Throughput",
            values: net_values,
            subtitle: "last 120s | auto-scale",
            label_a: "NET1 Mbps",
            label_b: "NET2 Mbps",
            series_a: &self.hist_net1,
            series_b: &self.hist_net2,
            min_val: 0.0,
            max_val: net_hist_max,
            color_a: series_net1,
            color_b: series_net2,
        };
        self.draw_graph_panel(frame, margin, content_y0, left_w, graph_h, &net_spec, time_sec);

        let cpu_values = format!("CPU {}%  TEMP {}C", cpu as i32, temp as i32);
        let cpu_spec = GraphPanelSpec {
            title: "CPU & TEMP",
            values: cpu_values,
            subtitle: "last 120s | 0-100",
            label_a: "CPU %",
            label_b: "TEMP C",
            series_a: &self.hist_cpu,
            series_b: &self.hist_temp,
            min_val: 0.0,
            max_val: 100.0,
            color_a: series_cpu,
            color_b: series_temp,
        };
        self.draw_graph_panel(
            frame,
            margin,
            content_y0 + graph_h + gap,
            left_w,
            graph_h,
            &cpu_spec,
            time_sec,
        );

        self.draw_vitals(
            frame,
            margin + left_w + gap,
            content_y0,
            right_w,
            content_y1 - content_y0,
            cpu,
            temp,
            metrics.mem_pct,
            net1,
        );

        if self.ui.footer {
            self.draw_footer(frame, 0, height - footer_h, width, footer_h, idle);
        }
    }

    fn draw_panel_frame(&self, frame: &mut Frame, x: i32, y: i32, w: i32, h: i32, title: &str, subtitle: &str) {
        let panel_bg = color::scale(self.theme.bar_bg, 0.80);
        frame.rounded_rect(x, y, w, h, 8, panel_bg, self.theme.bar_border);
        if !title.is_empty() {
            self.text
                .draw(frame, title, x + 12, y + 6, self.dim(self.theme.text_value), 14.0);
        }
        if !subtitle.is_empty() {
            self.text
                .draw(frame, subtitle, x + 12, y + 22, self.dim(self.theme.text_status), 11.0);
        }
        frame.line(x + 10, y + 32, x + w - 11, y + 32, self.theme.bar_border);
    }

    fn draw_graph_panel(
        &self,
        frame: &mut Frame,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        spec: &GraphPanelSpec<'_>,
        time_sec: f64,
    ) {
        self.draw_panel_frame(frame, x, y, w, h, spec.title, spec.subtitle);
        if !spec.values.is_empty() {
            let vw = self.text.measure(&spec.values, 11.0);
            self.text.draw(
                frame,
                &spec.values,
                x + w - vw - 12,
                y + 6,
                self.dim(self.theme.text_status),
                11.0,
            );
        }

        let legend_y = y + 36;
        let lx = x + 12;
        frame.fill_rect(lx, legend_y, 6, 6, spec.color_a);
        self.text.draw(
            frame,
            spec.label_a,
            lx + 10,
            legend_y - 2,
            self.dim(self.theme.text_status),
            11.0,
        );
        let lw = self.text.measure(spec.label_a, 11.0);
        let lx2 = lx + 10 + lw + 14;
        frame.fill_rect(lx2, legend_y, 6, 6, spec.color_b);
        self.text.draw(
            frame,
            spec.label_b,
            lx2 + 10,
            legend_y - 2,
            self.dim(self.theme.text_status),
            11.0,
        );

        let gx = x + 10;
        let gy = y + 48;
        let gw = w - 20;
        let gh = h - (gy - y) - 10;
        let grid_minor = color::scale(self.theme.bar_border, 0.25);
        let grid_major = color::scale(self.theme.bar_border, 0.45);
        frame.fill_rect(gx, gy, gw, gh, color::scale(self.theme.spark_bg, 0.9));
        let cols = 12;
        let rows = 6;
        for c in 1..cols {
            let px = gx + (c * gw) / cols;
            let col = if c % 3 == 0 { grid_major } else { grid_minor };
            frame.line(px, gy, px, gy + gh - 1, col);
        }
        for r in 1..rows {
            let py = gy + (r * gh) / rows;
            let col = if r % 2 == 0 { grid_major } else { grid_minor };
            frame.line(gx, py, gx + gw - 1, py, col);
        }

        let shadow_a = color::scale(spec.color_a, 0.5);
        let shadow_b = color::scale(spec.color_b, 0.5);
        spark::series_line(
            frame, spec.series_a, gx, gy, gw, gh, spec.min_val, spec.max_val, spec.color_a,
            shadow_a, 2, &self.spark_cfg, time_sec,
        );
        spark::series_line(
            frame, spec.series_b, gx, gy, gw, gh, spec.min_val, spec.max_val, spec.color_b,
            shadow_b, 2, &self.spark_cfg, time_sec,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_vitals(
        &self,
        frame: &mut Frame,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        cpu: f64,
        temp: f64,
        mem: f64,
        net1: f64,
    ) {
        self.draw_panel_frame(frame, x, y, w, h, "Vitals", "");
        let inner_y = y + 34;
        let inner_w = w - 16;
        let inner_h = h - (inner_y - y) - 8;
        let block_h = inner_h / 3;

        // Middle gauge shows RAM when it is known, NET1 otherwise.
        let use_ram = mem > 0.0;
        let (mid_val, mid_max, mid_color, mid_label, mid_text) = if use_ram {
            (mem, 100.0, self.state_color(mem, "ram"), "RAM", format!("{}%", mem as i32))
        } else {
            (net1, 2500.0, self.state_color(net1, "net"), "NET1", format_net(net1))
        };

        let gauges: [(f64, f64, Color, &str, String); 3] = [
            (cpu, 100.0, self.state_color(cpu, "cpu"), "CPU", format!("{}%", cpu as i32)),
            (mid_val, mid_max, mid_color, mid_label, mid_text),
            (temp, 100.0, self.state_color(temp, "temp"), "TEMP", format!("{}C", temp as i32)),
        ];

        for (idx, (value, max, gauge_color, label, value_text)) in gauges.iter().enumerate() {
            let lift = 10;
            let block_y = inner_y + idx as i32 * block_h;
            let cx = x + w / 2;
            let cy = block_y + block_h - 10 - lift;
            let ring_r = (inner_w / 2 - 6).min(block_h - 18).clamp(20, 30);
            let thickness = (ring_r / 3).clamp(10, 12);

            let active = self.dim(*gauge_color);
            let track = color::scale(active, 0.20);
            gauge::semi_gauge(frame, cx, cy, ring_r, thickness, (value / max).clamp(0.0, 1.0), active, track);

            let vw = self.text.measure(value_text, 14.0);
            let val_y = cy - (ring_r as f64 * 0.45) as i32;
            self.text.draw(frame, value_text, cx - vw / 2, val_y, self.dim(self.theme.text_value), 14.0);
            let lw = self.text.measure(label, 11.0);
            let label_y = block_y + block_h - 2 - lift;
            self.text.draw(frame, label, cx - lw / 2, label_y, self.dim(self.theme.text_status), 11.0);
        }
    }

    fn draw_header(
        &self,
        frame: &mut Frame,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        metrics: &MetricsSnapshot,
        wan: WanStatus,
    ) {
        frame.fill_rect(x, y, w, h, color::scale(self.theme.bar_bg, 0.75));
        frame.line(x, y + h - 1, x + w - 1, y + h - 1, self.theme.bar_border);

        self.text.draw(
            frame,
            &self.title,
            x + 12,
            y + (h - 14) / 2,
            self.dim(self.theme.text_status),
            14.0,
        );

        let label_col = self.dim(self.theme.text_status);
        let neutral_val = self.dim(self.theme.text_value);
        let ok_col = rgb(0, 255, 120);
        let warn_col = rgb(255, 230, 0);
        let bad_col = rgb(255, 60, 60);

        let wan_color = match wan {
            WanStatus::Ok => ok_col,
            WanStatus::Degraded => warn_col,
            _ => bad_col,
        };
        let wg_color = match metrics.wg_peers {
            n if n > 0 => ok_col,
            0 => bad_col,
            _ => neutral_val,
        };
        let mc_color = match metrics.mc_online {
            n if n > 0 => ok_col,
            0 => bad_col,
            _ => neutral_val,
        };

        let wg = if metrics.wg_peers >= 0 {
            metrics.wg_peers.to_string()
        } else {
            "-".to_string()
        };

        let mut segments: Vec<(String, Color)> = Vec::with_capacity(16);
        segments.push(("WAN:".to_string(), label_col));
        segments.push((format!(" {wan}"), wan_color));
        segments.push(("  ".to_string(), label_col));
        segments.push(("WG:".to_string(), label_col));
        segments.push((format!(" {wg}"), wg_color));
        segments.push(("  ".to_string(), label_col));
        segments.push(("MC:".to_string(), label_col));
        if metrics.mc_online >= 0 && metrics.mc_max >= 0 {
            segments.push((format!(" {}", metrics.mc_online), mc_color));
            segments.push((format!("/{}", metrics.mc_max), neutral_val));
        } else if metrics.mc_online >= 0 {
            segments.push((format!(" {}", metrics.mc_online), mc_color));
        } else {
            segments.push((" -".to_string(), mc_color));
        }
        segments.push(("  ".to_string(), label_col));
        segments.push(("Uptime:".to_string(), label_col));
        segments.push((format!(" {}", format_uptime(metrics.uptime_s)), neutral_val));

        let fs = 22.0;
        let ry = y + (h - fs as i32) / 2;
        let total_w: i32 = segments.iter().map(|(t, _)| self.text.measure(t, fs)).sum();
        let mut cx = x + (w - total_w) / 2;
        for (t, c) in &segments {
            self.text.draw(frame, t, cx, ry, self.dim(*c), fs);
            cx += self.text.measure(t, fs);
        }
    }

    fn draw_footer(&mut self, frame: &mut Frame, x: i32, y: i32, w: i32, h: i32, idle: &IdleController) {
        frame.fill_rect(x, y, w, h, color::scale(self.theme.bar_bg, 0.75));
        frame.line(x, y, x + w - 1, y, self.theme.bar_border);
        if self.ticker_text.is_empty() {
            return;
        }
        let fs = 18.0;
        let start_x = x + 14;
        let end_x = x + w - 14;
        let zone_w = end_x - start_x;
        if zone_w <= 20 {
            return;
        }
        let text_w = self.text.measure(&self.ticker_text, fs);
        let speed = self.ticker_speed * if idle.is_idle() { 0.4 } else { 1.0 };
        if self.ticker_offset > (zone_w + text_w + 20) as f32 {
            self.ticker_offset = 0.0;
        }
        self.ticker_offset += speed;
        let tx = start_x + zone_w - self.ticker_offset as i32;
        let ty = y + (h - fs as i32) / 2;
        let ticker_color = self.dim(self.theme.text_status);
        self.text
            .draw_clipped(frame, &self.ticker_text.clone(), tx, ty, ticker_color, fs, start_x, y, zone_w, h);
    }

    fn draw_print_screen(&self, frame: &mut Frame, printer: &PrinterMetrics, _time_sec: f64) {
        let (left_x, left_y, left_w, left_h) = (10, 10, 310, 300);
        let (right_x, right_y, right_w, right_h) = (330, 10, 140, 300);

        self.draw_panel_frame(frame, left_x, left_y, left_w, left_h, "Preview", "");
        self.draw_panel_frame(frame, right_x, right_y, right_w, right_h, "Print", "");
        // The print panel runs content right under the header, no divider.
        let panel_bg = color::scale(self.theme.bar_bg, 0.80);
        frame.fill_rect(right_x + 10, right_y + 32, right_w - 21, 1, panel_bg);

        let img_pad = 12;
        let img_x = left_x + img_pad;
        let img_y = left_y + 36;
        let img_w = left_w - img_pad * 2;
        let img_h = left_h - (img_y - left_y) - img_pad;
        self.draw_thumb_fit(frame, img_x, img_y, img_w, img_h, printer);

        let pct = (printer.progress * 100.0).clamp(0.0, 100.0);
        let pct_text = format!("{pct:.3}%");
        let pct_size = 28.0;
        let pct_w = self.text.measure(&pct_text, pct_size);
        self.text.draw(
            frame,
            &pct_text,
            right_x + (right_w - pct_w) / 2,
            right_y + 36,
            self.dim(self.theme.text_value),
            pct_size,
        );

        let state = if printer.state.is_empty() {
            "IDLE".to_string()
        } else {
            printer.state.to_uppercase()
        };
        let vivid_ok = rgb(0, 255, 80);
        let vivid_warn = rgb(255, 230, 0);
        let status_color = match printer.state.as_str() {
            "paused" => vivid_warn,
            "error" => self.theme.state_high,
            _ => vivid_ok,
        };
        let status_color = self.dim(status_color);
        let track = color::scale(status_color, 0.20);

        let gauge_top = right_y + 52;
        let gauge_h = 120;
        let cx = right_x + right_w / 2;
        let cy = gauge_top + gauge_h - 10;
        let ring_r = (right_w / 2 - 8).min(gauge_h - 20).max(24);
        let thickness = (ring_r / 3).clamp(10, 12);
        gauge::semi_gauge(frame, cx, cy, ring_r, thickness, printer.progress.clamp(0.0, 1.0), status_color, track);

        let detail_fs = 11.0;
        let mut detail_y = gauge_top + gauge_h + 6;
        self.text.draw(frame, &state, right_x + 10, detail_y, status_color, detail_fs);
        detail_y += 14;

        let eta = if printer.eta_s > 0 {
            format!("ETA {}", format_duration_short(printer.eta_s))
        } else {
            "ETA --".to_string()
        };
        let elapsed = format!("E {}", format_duration_short(printer.elapsed_s as i64));
        self.text
            .draw(frame, &eta, right_x + 10, detail_y, self.dim(self.theme.text_status), detail_fs);
        let el_w = self.text.measure(&elapsed, detail_fs);
        self.text.draw(
            frame,
            &elapsed,
            right_x + right_w - el_w - 10,
            detail_y,
            self.dim(self.theme.text_status),
            detail_fs,
        );
        detail_y += 14;

        let fname = if printer.filename.is_empty() {
            "-".to_string()
        } else {
            printer.filename.clone()
        };
        let fname = self.text.trim_to_width(&fname, detail_fs, right_w - 20);
        self.text
            .draw(frame, &fname, right_x + 10, detail_y, self.dim(self.theme.text_value), detail_fs);
    }

    /// Aspect-fit the RGBA thumbnail into the preview box with nearest
    /// sampling and per-pixel alpha compositing.
    fn draw_thumb_fit(&self, frame: &mut Frame, x: i32, y: i32, w: i32, h: i32, printer: &PrinterMetrics) {
        let bg = color::scale(self.theme.spark_bg, 0.85);
        frame.fill_rect(x, y, w, h, bg);
        let Some(img) = printer.thumb.as_deref() else {
            self.text.draw(
                frame,
                "NO PREVIEW",
                x + 8,
                y + h / 2 - 6,
                self.dim(self.theme.text_status),
                12.0,
            );
            return;
        };
        if img.rgba.is_empty() || img.width == 0 || img.height == 0 {
            return;
        }
        let iw = img.width as i32;
        let ih = img.height as i32;
        let scale = (w as f64 / iw as f64).min(h as f64 / ih as f64);
        let dw = ((iw as f64 * scale).round() as i32).max(1);
        let dh = ((ih as f64 * scale).round() as i32).max(1);
        let dx = x + (w - dw) / 2;
        let dy = y + (h - dh) / 2;

        for yy in 0..dh {
            let sy = (yy * ih) / dh;
            for xx in 0..dw {
                let sx = (xx * iw) / dw;
                let src = ((sy * iw + sx) * 4) as usize;
                let (sr, sg, sb, sa) = (
                    img.rgba[src],
                    img.rgba[src + 1],
                    img.rgba[src + 2],
                    img.rgba[src + 3],
                );
                if sa == 0 {
                    continue;
                }
                let px = dx + xx;
                let py = dy + yy;
                if sa == 255 {
                    frame.set(px, py, color::from_rgb888(sr, sg, sb));
                } else if let Some(dst) = frame.get(px, py) {
                    let (dr, dg, db) = color::to_rgb888(dst);
                    let a = sa as u32;
                    let r = ((sr as u32 * a + dr as u32 * (255 - a)) / 255) as u8;
                    let g = ((sg as u32 * a + dg as u32 * (255 - a)) / 255) as u8;
                    let b = ((sb as u32 * a + db as u32 * (255 - a)) / 255) as u8;
                    frame.set(px, py, color::from_rgb888(r, g, b));
                }
            }
        }
    }
}
