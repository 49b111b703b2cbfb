// Arc-based gauges drawn through the trig tables

use super::color::Color;
use super::fb::Frame;
use super::luts::{fast_cos, fast_sin};

/// Single-radius arc approximated by a polyline. Segment count scales with
/// span and radius: clamp(24, span·r·1.2, 180).
pub fn arc_polyline(
    frame: &mut Frame,
    cx: i32,
    cy: i32,
    r: i32,
    a0: f64,
    a1: f64,
    color: Color,
    invert_y: bool,
) {
    let span = (a1 - a0).abs();
    let steps = ((span * r as f64 * 1.2) as i32).clamp(24, 180);
    let step = (a1 - a0) / steps as f64;
    let point = |a: f64| {
        let sin = if invert_y { -fast_sin(a) } else { fast_sin(a) };
        (
            cx + (fast_cos(a) * r as f32) as i32,
            cy + (sin * r as f32) as i32,
        )
    };
    let (mut px, mut py) = point(a0);
    for i in 1..=steps {
        let (x, y) = point(a0 + step * i as f64);
        frame.line(px, py, x, y, color);
        px = x;
        py = y;
    }
}

/// Thick arc as nested single-pixel arcs from `r` down to `r - t + 1`.
pub fn thick_arc(
    frame: &mut Frame,
    cx: i32,
    cy: i32,
    r: i32,
    thickness: i32,
    a0: f64,
    a1: f64,
    color: Color,
    invert_y: bool,
) {
    let t = thickness.max(1);
    for i in 0..t {
        let rr = r - i;
        if rr <= 0 {
            break;
        }
        arc_polyline(frame, cx, cy, rr, a0, a1, color, invert_y);
    }
}

/// Full-circle progress ring starting at twelve o'clock, with rounded caps
/// at the start and the progress end, and an optional flat inner disc.
#[allow(clippy::too_many_arguments)]
pub fn ring_gauge(
    frame: &mut Frame,
    cx: i32,
    cy: i32,
    r: i32,
    thickness: i32,
    frac: f64,
    active: Color,
    track: Color,
    inner: Option<Color>,
) {
    let f = frac.clamp(0.0, 1.0);
    let start = -std::f64::consts::FRAC_PI_2;
    let end = start + std::f64::consts::TAU * f;

    thick_arc(frame, cx, cy, r, thickness, start, start + std::f64::consts::TAU, track, false);

    if f > 0.0 {
        thick_arc(frame, cx, cy, r, thickness, start, end, active, false);
        let cap_r = (thickness / 2).max(2);
        let cap_rad = r - thickness / 2;
        let cap = |a: f64| {
            (
                cx + (fast_cos(a) * cap_rad as f32) as i32,
                cy + (fast_sin(a) * cap_rad as f32) as i32,
            )
        };
        let (x0, y0) = cap(start);
        let (x1, y1) = cap(end);
        frame.filled_circle(x0, y0, cap_r, active);
        frame.filled_circle(x1, y1, cap_r, active);
    }

    if let Some(inner_color) = inner {
        let inner_r = r - thickness - 1;
        if inner_r > 0 {
            frame.filled_circle(cx, cy, inner_r, inner_color);
        }
    }
}

/// Top-half semicircle gauge sweeping left to right, rounded caps at the
/// start and the current progress angle.
pub fn semi_gauge(
    frame: &mut Frame,
    cx: i32,
    cy: i32,
    r: i32,
    thickness: i32,
    frac: f64,
    active: Color,
    track: Color,
) {
    let f = frac.clamp(0.0, 1.0);
    let start = std::f64::consts::PI;
    let end = 0.0;
    let prog_end = start - (start - end) * f;

    thick_arc(frame, cx, cy, r, thickness, start, end, track, true);

    if f > 0.0 {
        thick_arc(frame, cx, cy, r, thickness, start, prog_end, active, true);
        let cap_r = (thickness / 2).max(2);
        let cap_rad = r - thickness / 2;
        let cap = |a: f64| {
            (
                cx + (fast_cos(a) * cap_rad as f32) as i32,
                cy + (-fast_sin(a) * cap_rad as f32) as i32,
            )
        };
        let (x0, y0) = cap(start);
        let (x1, y1) = cap(prog_end);
        frame.filled_circle(x0, y0, cap_r, active);
        frame.filled_circle(x1, y1, cap_r, active);
    }
}
