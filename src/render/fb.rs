// RGB565 framebuffer and clipped pixel primitives

use super::color::{self, Color};

pub const DISPLAY_WIDTH: usize = 480;
pub const DISPLAY_HEIGHT: usize = 320;

/// Row-major RGB565 framebuffer. Two of these are allocated at startup and
/// swapped by the run loop after each successful send; the "previous" one
/// is never mutated between swaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub px: Vec<u16>,
}

impl Frame {
    pub fn new() -> Self {
        Self::with_size(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            px: vec![0; width * height],
        }
    }

    pub fn fill(&mut self, c: Color) {
        self.px.fill(c);
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.px[y as usize * self.width + x as usize])
    }

    /// Plot one pixel; out-of-range writes are silently dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, c: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.px[y as usize * self.width + x as usize] = c;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x + w).min(self.width as i32)).max(0) as usize;
        let y1 = ((y + h).min(self.height as i32)).max(0) as usize;
        for row in y0..y1 {
            self.px[row * self.width + x0..row * self.width + x1].fill(c);
        }
    }

    /// Bresenham line, endpoints inclusive.
    pub fn line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, c: Color) {
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x0, y0, c);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Midpoint circle outline.
    pub fn circle(&mut self, cx: i32, cy: i32, r: i32, c: Color) {
        let mut x = -r;
        let mut y = 0;
        let mut err = 2 - 2 * r;
        let mut r = r;
        loop {
            self.set(cx - x, cy + y, c);
            self.set(cx - y, cy - x, c);
            self.set(cx + x, cy - y, c);
            self.set(cx + y, cy + x, c);
            r = err;
            if r <= y {
                y += 1;
                err += y * 2 + 1;
            }
            if r > x || err > y {
                x += 1;
                err += x * 2 + 1;
            }
            if x >= 0 {
                break;
            }
        }
    }

    /// Filled circle by per-row x-scan. Small radii (the common case for
    /// gauge caps and pulse dots) stay in integer arithmetic to keep sqrt
    /// out of the hot loop.
    pub fn filled_circle(&mut self, cx: i32, cy: i32, r: i32, c: Color) {
        if r <= 0 {
            return;
        }
        let r2 = r * r;
        for y in -r..=r {
            let y2 = y * y;
            let dx = if r <= 10 {
                let max_dx2 = r2 - y2;
                if max_dx2 < 0 {
                    0
                } else {
                    let mut dx = 0;
                    while (dx + 1) * (dx + 1) <= max_dx2 {
                        dx += 1;
                    }
                    dx
                }
            } else {
                ((r2 - y2).max(0) as f64).sqrt() as i32
            };
            let py = cy + y;
            if py < 0 || py as usize >= self.height {
                continue;
            }
            let x0 = (cx - dx).max(0);
            let x1 = (cx + dx).min(self.width as i32 - 1);
            if x0 > x1 {
                continue;
            }
            let base = py as usize * self.width;
            self.px[base + x0 as usize..=base + x1 as usize].fill(c);
        }
    }

    /// Rounded rectangle: border-color fill of the outer shape, then the
    /// inner fill inset by one pixel.
    pub fn rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, fill: Color, border: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let rr = r.min(w / 2).min(h / 2);
        self.fill_rounded(x, y, w, h, rr, border);
        if w > 2 && h > 2 {
            self.fill_rounded(x + 1, y + 1, w - 2, h - 2, (rr - 1).max(0), fill);
        }
    }

    fn fill_rounded(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, c: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let r = r.min(w / 2).min(h / 2);
        if r <= 0 {
            self.fill_rect(x, y, w, h, c);
            return;
        }
        self.fill_rect(x + r, y, w - 2 * r, h, c);
        self.fill_rect(x, y + r, r, h - 2 * r, c);
        self.fill_rect(x + w - r, y + r, r, h - 2 * r, c);
        self.filled_circle(x + r, y + r, r, c);
        self.filled_circle(x + w - r - 1, y + r, r, c);
        self.filled_circle(x + r, y + h - r - 1, r, c);
        self.filled_circle(x + w - r - 1, y + h - r - 1, r, c);
    }

    /// Vertical gradient from `c1` (top row) to `c2` (bottom row).
    pub fn v_gradient(&mut self, x: i32, y: i32, w: i32, h: i32, c1: Color, c2: Color) {
        if h <= 1 {
            self.fill_rect(x, y, w, h, c1);
            return;
        }
        for i in 0..h {
            let t = i as f32 / (h - 1) as f32;
            let row_color = color::interpolate(c1, c2, t);
            self.fill_rect(x, y + i, w, 1, row_color);
        }
    }

    /// Regular grid of 1-px lines with the given cell size and phase offset.
    pub fn grid(&mut self, x: i32, y: i32, w: i32, h: i32, cell: i32, offset_x: i32, offset_y: i32, c: Color) {
        if cell <= 0 {
            return;
        }
        let mut gx = x + offset_x;
        while gx < x + w {
            self.line(gx, y, gx, y + h - 1, c);
            gx += cell;
        }
        let mut gy = y + offset_y;
        while gy < y + h {
            self.line(x, gy, x + w - 1, gy, c);
            gy += cell;
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
