// Sparkline and series plotting with value-adaptive zoom and layered effects

use crate::config::SparklineConfig;

use super::animation::AnimationEngine;
use super::color::{self, Color, rgb};
use super::fb::Frame;
use super::history::HistoryRing;
use super::luts::{fast_exp, fast_sin};

/// Which metric a plot shows; selects zoom parameters and animation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Cpu,
    Temp,
    Net1,
    Net2,
}

struct ZoomParams {
    start: f64,
    end: f64,
    min_range: f64,
    gamma_key: &'static str,
}

const GAMMA_MIN: f64 = 0.55;
const GAMMA_MAX: f64 = 1.0;

// Balanced gradients: visible but not overpowering.
const FILL_ALPHA_SPARK: f64 = 0.70;
const FILL_DECAY_SPARK: f64 = 1.5;
const FILL_INTENSITY_SERIES: f64 = 0.55;
const FILL_DECAY_SERIES: f64 = 1.4;

fn zoom_params(kind: MetricKind) -> ZoomParams {
    match kind {
        MetricKind::Cpu => ZoomParams {
            start: 5.0,
            end: 60.0,
            min_range: 0.5,
            gamma_key: "cpu_gamma",
        },
        MetricKind::Temp => ZoomParams {
            start: 30.0,
            end: 70.0,
            min_range: 0.2,
            gamma_key: "temp_gamma",
        },
        MetricKind::Net1 => ZoomParams {
            start: 20.0,
            end: 800.0,
            min_range: 1.0,
            gamma_key: "net1_gamma",
        },
        MetricKind::Net2 => ZoomParams {
            start: 20.0,
            end: 800.0,
            min_range: 1.0,
            gamma_key: "net2_gamma",
        },
    }
}

/// Strict local maxima over a window of 5 whose normalized value clears 0.6.
fn find_peaks(data: &[f64], normalized: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if data.len() < 5 {
        return peaks;
    }
    for i in 2..data.len() - 2 {
        if data[i] > data[i - 1]
            && data[i] > data[i - 2]
            && data[i] > data[i + 1]
            && data[i] > data[i + 2]
            && normalized[i] > 0.6
        {
            peaks.push(i);
        }
    }
    peaks
}

/// Cooler tint below a third, warmer above two thirds of the range.
fn zone_shift(r: u8, g: u8, b: u8, val: f64, strong: bool) -> (u8, u8, u8) {
    let (lo_r, lo_b, hi_r, hi_g, hi_b) = if strong {
        (0.85, 1.15, 1.15, 0.95, 0.85)
    } else {
        (0.9, 1.1, 1.1, 0.97, 0.9)
    };
    if val < 0.33 {
        (
            (r as f64 * lo_r) as u8,
            g,
            ((b as f64 * lo_b) as i32).min(255) as u8,
        )
    } else if val > 0.66 {
        (
            ((r as f64 * hi_r) as i32).min(255) as u8,
            (g as f64 * hi_g) as u8,
            (b as f64 * hi_b) as u8,
        )
    } else {
        (r, g, b)
    }
}

fn gradient_line_color(color: Color, val: f64) -> Color {
    if val < 0.33 {
        color::interpolate(color::scale(color, 0.7), color, (val * 3.0) as f32)
    } else if val > 0.66 {
        let hot = color::interpolate(color, rgb(255, 200, 100), 0.4);
        color::interpolate(color, hot, ((val - 0.66) * 3.0) as f32)
    } else {
        color
    }
}

/// Sparkline inside a panel plot area. The vertical transform adapts to
/// the working range of the metric: a blended reference level picks a zoom
/// factor, which drives a visual gamma smoothed through the animation
/// engine so transitions do not pop.
#[allow(clippy::too_many_arguments)]
pub fn sparkline(
    frame: &mut Frame,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    data: &HistoryRing,
    min_val: f64,
    max_val: f64,
    color: Color,
    bg_color: Color,
    line_width: i32,
    baseline_color: Color,
    kind: MetricKind,
    animator: &mut AnimationEngine,
    cfg: &SparklineConfig,
    time_sec: f64,
) {
    if data.len() < 2 {
        return;
    }
    let samples: Vec<f64> = data.iter().collect();
    let n = samples.len();

    frame.fill_rect(x, y, w, h, bg_color);

    let zoom = zoom_params(kind);

    let (data_min, data_max) = data.min_max().unwrap_or((0.0, 0.0));
    let data_range = data_max - data_min;
    let scale_range = max_val - min_val;
    let is_flat = data_range < (0.03 * scale_range).max(zoom.min_range * 0.2);

    let last = samples[n - 1];
    let reference = 0.7 * max_val + 0.3 * last;
    let t = ((reference - zoom.start) / (zoom.end - zoom.start + 1e-9)).clamp(0.0, 1.0);

    let target_gamma = GAMMA_MIN + t * (GAMMA_MAX - GAMMA_MIN);
    let gamma = if cfg.smooth_transitions {
        animator.set_target(zoom.gamma_key, target_gamma);
        animator.get(zoom.gamma_key, 1.0)
    } else {
        target_gamma
    };

    let baseline_frac = 0.85 - t * 0.10;
    let baseline_y = y + (h as f64 * baseline_frac) as i32;

    // A flat history collapses to one height derived from the last sample.
    let flat_v = if is_flat {
        let v0 = ((last - min_val) / (max_val - min_val + 1e-9)).clamp(0.0, 1.0);
        0.15 + 0.7 * v0
    } else {
        0.5
    };

    let mut points = Vec::with_capacity(n);
    let mut normalized = Vec::with_capacity(n);
    for (i, &s) in samples.iter().enumerate() {
        let v = if is_flat {
            flat_v
        } else {
            ((s - min_val) / (max_val - min_val + 1e-9))
                .clamp(0.0, 1.0)
                .powf(gamma)
        };
        normalized.push(v);
        let px = x + 1 + ((i as f64 / (n - 1) as f64) * (w - 2) as f64) as i32;
        let py = y + h - 1 - (v * (h - 2) as f64) as i32;
        points.push((px, py));
    }

    let peaks = if cfg.peak_highlight && !is_flat {
        find_peaks(&samples, &normalized)
    } else {
        Vec::new()
    };

    // Shadow under the line, blended against the plot background.
    if cfg.shadow {
        let shadow = color::scale(color, 0.25);
        let blended = color::blend(shadow, bg_color, 0.3);
        for i in 1..points.len() {
            let (mut x0, mut y0) = (points[i - 1].0, points[i - 1].1 + 2);
            let (mut x1, mut y1) = (points[i].0, points[i].1 + 2);
            if x0 > x1 {
                std::mem::swap(&mut x0, &mut x1);
                std::mem::swap(&mut y0, &mut y1);
            }
            let dx = (x1 - x0).max(1);
            for xi in x0..=x1 {
                let tseg = (xi - x0) as f64 / dx as f64;
                let yi = (y0 as f64 + (y1 - y0) as f64 * tseg).round() as i32;
                frame.set(xi, yi, blended);
            }
        }
    }

    // Gradient fill under the line: bright band close to the line, then
    // exponential decay toward the bottom, sampled via the exp LUT.
    {
        let (fr, fg, fb) = color::to_rgb888(color);
        let (br, bg_, bb) = color::to_rgb888(bg_color);
        let bottom_y = y + h - 1;

        for i in 0..points.len().saturating_sub(1) {
            let (mut x0, mut y0) = points[i];
            let (mut x1, mut y1) = points[i + 1];
            if x0 > x1 {
                std::mem::swap(&mut x0, &mut x1);
                std::mem::swap(&mut y0, &mut y1);
            }
            let dx = (x1 - x0).max(1);
            for xi in x0..=x1 {
                let tseg = (xi - x0) as f64 / dx as f64;
                let top_f = y0 as f64 + (y1 - y0) as f64 * tseg;
                let top = (top_f.round() as i32).clamp(y, bottom_y);
                let denom = ((bottom_y - top) as f64).max(1.0);

                for py in top..=bottom_y {
                    let norm = (py as f64 - top_f) / denom;
                    let alpha = if cfg.enhanced_fill {
                        if norm < 0.2 {
                            FILL_ALPHA_SPARK * (1.0 - norm * 2.0)
                        } else {
                            FILL_ALPHA_SPARK * 0.6 * fast_exp(FILL_DECAY_SPARK * (norm - 0.2)) as f64
                        }
                    } else {
                        FILL_ALPHA_SPARK * fast_exp(FILL_DECAY_SPARK * norm) as f64
                    };
                    if alpha < 0.001 {
                        continue;
                    }

                    let (mut fill_r, mut fill_g, mut fill_b) = (fr, fg, fb);
                    if cfg.color_zones {
                        (fill_r, fill_g, fill_b) = zone_shift(fr, fg, fb, normalized[i], true);
                    }
                    let r = (fill_r as f64 * alpha + br as f64 * (1.0 - alpha)) as u8;
                    let g = (fill_g as f64 * alpha + bg_ as f64 * (1.0 - alpha)) as u8;
                    let b = (fill_b as f64 * alpha + bb as f64 * (1.0 - alpha)) as u8;
                    frame.set(xi, py, color::from_rgb888(r, g, b));
                }
            }
        }
    }

    // The line itself, with optional value-keyed color and thickness.
    for i in 1..points.len() {
        let (mut x0, mut y0) = points[i - 1];
        let (mut x1, mut y1) = points[i];
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        let val_prev = normalized[i - 1];
        let val_curr = normalized[i];

        let dx = (x1 - x0).max(1);
        for xi in x0..=x1 {
            let tseg = (xi - x0) as f64 / dx as f64;
            let yi = (y0 as f64 + (y1 - y0) as f64 * tseg).round() as i32;
            let val = val_prev + (val_curr - val_prev) * tseg;

            let line_color = if cfg.gradient_line {
                gradient_line_color(color, val)
            } else {
                color
            };
            let lw = if cfg.dynamic_width && val > 0.5 {
                (line_width + 1).max(2)
            } else {
                line_width
            };

            frame.set(xi, yi, line_color);
            if lw > 1 {
                frame.set(xi, yi + 1, line_color);
            }
            if lw > 2 {
                frame.set(xi, yi - 1, line_color);
            }
        }
    }

    // Bloom around strict local peaks.
    for &pi in &peaks {
        let (px, py) = points[pi];
        let glow = color::interpolate(color, rgb(255, 255, 255), 0.5);
        frame.filled_circle(px, py, 4, color::scale(glow, 0.2));
        frame.filled_circle(px, py, 3, color::scale(glow, 0.4));
        frame.filled_circle(px, py, 2, glow);
    }

    // Short trails where the signal moved fast.
    if cfg.particles && n >= 3 {
        for i in 2..n {
            let change = (normalized[i] - normalized[i - 1]).abs();
            if change > 0.15 {
                let (px, py) = points[i];
                let dir = if normalized[i] > normalized[i - 1] { -1 } else { 1 };
                for j in 1..=3 {
                    let trail_y = py + dir * j * 3;
                    let trail_alpha = 0.6 * (1.0 - j as f32 * 0.25);
                    if trail_y >= y && trail_y < y + h {
                        frame.set(px, trail_y, color::scale(color, trail_alpha));
                    }
                }
            }
        }
    }

    // Baseline: shimmering dashes or a plain rule.
    if cfg.baseline_shimmer {
        let phase = (time_sec * 2.0) % 20.0;
        let dash = 4;
        let gap = 3;
        for xi in x + 1..x + w - 1 {
            let pos = ((xi - x) + phase as i32) % (dash + gap);
            if pos < dash {
                let shimmer = 0.7 + 0.3 * fast_sin((xi - x) as f64 * 0.2 + phase);
                frame.set(xi, baseline_y, color::scale(baseline_color, shimmer));
            }
        }
    } else {
        frame.line(x + 1, baseline_y, x + w - 2, baseline_y, baseline_color);
    }

    // Endpoint: pulsing glow or a static ring.
    let (px, py) = points[n - 1];
    if cfg.pulse {
        let activity = normalized[n - 1];
        let freq = 1.0 + activity * 1.5;
        let pulse_scale = 1.0 + 0.4 * fast_sin(time_sec * std::f64::consts::PI * freq) as f64;
        let pulse_r = (2.5 * pulse_scale) as i32;
        let glow_r = pulse_r + 2;
        frame.filled_circle(px, py, glow_r, color::scale(color, 0.25));
        frame.filled_circle(px, py, glow_r - 1, color::scale(color, 0.5));
        frame.filled_circle(px, py, pulse_r, color);
        frame.filled_circle(
            px,
            py,
            (pulse_r - 1).max(1),
            color::interpolate(color, rgb(255, 255, 255), 0.6),
        );
    } else {
        frame.circle(px, py, 2, color);
    }
}

/// Series overlay for the large graph panels. Same layer set as the
/// sparkline but the fill is blended additively over whatever is already
/// in the panel, so two overlaid series stay readable.
#[allow(clippy::too_many_arguments)]
pub fn series_line(
    frame: &mut Frame,
    data: &HistoryRing,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    min_val: f64,
    max_val: f64,
    color: Color,
    shadow_color: Color,
    width: i32,
    cfg: &SparklineConfig,
    time_sec: f64,
) {
    if data.len() < 2 {
        return;
    }
    let samples: Vec<f64> = data.iter().collect();
    let n = samples.len();
    let inner_w = (w - 2).max(1);
    let inner_h = (h - 2).max(1);
    let range = (max_val - min_val).max(1e-6);

    let mut points = Vec::with_capacity(n);
    let mut normalized = Vec::with_capacity(n);
    for (i, &s) in samples.iter().enumerate() {
        let v = ((s - min_val) / range).clamp(0.0, 1.0);
        normalized.push(v);
        let px = x + 1 + ((i as f64 / (n - 1) as f64) * inner_w as f64) as i32;
        let py = y + h - 1 - (v * inner_h as f64) as i32;
        points.push((px, py));
    }

    let peaks = if cfg.peak_highlight {
        find_peaks(&samples, &normalized)
    } else {
        Vec::new()
    };

    if cfg.shadow {
        let shadow = color::scale(color, 0.3);
        let (mut px, mut py) = (points[0].0, points[0].1 + 2);
        for &(x1, y1) in &points[1..] {
            frame.line(px, py, x1, y1 + 2, shadow);
            px = x1;
            py = y1 + 2;
        }
    }

    // Additive fill under the line.
    {
        let (fr, fg, fb) = color::to_rgb888(color);
        let bottom_y = y + h - 1;
        for i in 0..points.len() - 1 {
            let (mut x0, mut y0) = points[i];
            let (mut x1, mut y1) = points[i + 1];
            if x0 > x1 {
                std::mem::swap(&mut x0, &mut x1);
                std::mem::swap(&mut y0, &mut y1);
            }
            let dx = (x1 - x0).max(1);
            for xi in x0..=x1 {
                if xi < 0 || xi >= frame.width as i32 {
                    continue;
                }
                let tseg = (xi - x0) as f64 / dx as f64;
                let top_f = y0 as f64 + (y1 - y0) as f64 * tseg;
                let top = (top_f.round() as i32).clamp(y, bottom_y);
                let denom = ((bottom_y - top) as f64).max(1.0);

                for py in top..=bottom_y {
                    if py < 0 || py >= frame.height as i32 {
                        continue;
                    }
                    let norm = (py as f64 - top_f) / denom;
                    let intensity = if cfg.enhanced_fill {
                        if norm < 0.15 {
                            FILL_INTENSITY_SERIES * (1.0 - norm * 3.0)
                        } else {
                            FILL_INTENSITY_SERIES
                                * 0.7
                                * fast_exp(FILL_DECAY_SERIES * (norm - 0.15)) as f64
                        }
                    } else {
                        FILL_INTENSITY_SERIES * fast_exp(FILL_DECAY_SERIES * norm) as f64
                    };
                    if intensity < 0.001 {
                        continue;
                    }

                    let (mut fill_r, mut fill_g, mut fill_b) = (fr, fg, fb);
                    if cfg.color_zones {
                        (fill_r, fill_g, fill_b) = zone_shift(fr, fg, fb, normalized[i], false);
                    }
                    let dst = frame.get(xi, py).unwrap_or(0);
                    frame.set(
                        xi,
                        py,
                        color::blend_additive(color::from_rgb888(fill_r, fill_g, fill_b), dst, intensity),
                    );
                }
            }
        }
    }

    // The line, segment by segment.
    let (mut prev_x, mut prev_y) = points[0];
    for i in 1..points.len() {
        let (px, py) = points[i];
        let val_avg = (normalized[i - 1] + normalized[i]) * 0.5;

        let line_color = if cfg.gradient_line {
            gradient_line_color_series(color, val_avg)
        } else {
            color
        };
        let lw = if cfg.dynamic_width && val_avg > 0.5 {
            width + 1
        } else {
            width
        };

        if shadow_color != color && !cfg.shadow {
            frame.line(prev_x, prev_y + 1, px, py + 1, shadow_color);
        }
        frame.line(prev_x, prev_y, px, py, line_color);
        if lw > 1 {
            frame.line(prev_x, prev_y + 1, px, py + 1, line_color);
        }
        if lw > 2 {
            frame.line(prev_x, prev_y - 1, px, py - 1, line_color);
        }

        prev_x = px;
        prev_y = py;
    }

    for &pi in &peaks {
        let (px, py) = points[pi];
        let glow = color::interpolate(color, rgb(255, 255, 255), 0.4);
        frame.filled_circle(px, py, 5, color::scale(glow, 0.15));
        frame.filled_circle(px, py, 4, color::scale(glow, 0.3));
        frame.filled_circle(px, py, 3, color::scale(glow, 0.5));
        frame.filled_circle(px, py, 2, glow);
    }

    if cfg.particles && n >= 3 {
        for i in 2..n {
            let change = (normalized[i] - normalized[i - 1]).abs();
            if change > 0.12 {
                let (px, py) = points[i];
                let dir = if normalized[i] > normalized[i - 1] { -1 } else { 1 };
                for j in 1..=4 {
                    let trail_y = py + dir * j * 4;
                    let trail_alpha = 0.5 * (1.0 - j as f32 * 0.2);
                    if trail_y >= y && trail_y < y + h {
                        frame.line(px - 1, trail_y, px + 1, trail_y, color::scale(color, trail_alpha));
                    }
                }
            }
        }
    }

    if cfg.pulse {
        let activity = normalized[n - 1];
        let freq = 1.0 + activity * 1.2;
        let pulse_scale = 1.0 + 0.35 * fast_sin(time_sec * std::f64::consts::PI * freq) as f64;
        let pulse_r = (3.0 * pulse_scale) as i32;
        let glow_r = pulse_r + 3;
        frame.filled_circle(prev_x, prev_y, glow_r, color::scale(color, 0.2));
        frame.filled_circle(prev_x, prev_y, glow_r - 1, color::scale(color, 0.4));
        frame.filled_circle(prev_x, prev_y, pulse_r, color);
        frame.filled_circle(
            prev_x,
            prev_y,
            (pulse_r - 1).max(1),
            color::interpolate(color, rgb(255, 255, 255), 0.5),
        );
    } else {
        frame.filled_circle(prev_x, prev_y, 2, color);
    }
}

fn gradient_line_color_series(color: Color, val: f64) -> Color {
    if val < 0.33 {
        color::interpolate(color::scale(color, 0.75), color, (val * 3.0) as f32)
    } else if val > 0.66 {
        let hot = color::interpolate(color, rgb(255, 200, 120), 0.35);
        color::interpolate(color, hot, ((val - 0.66) * 3.0) as f32)
    } else {
        color
    }
}
