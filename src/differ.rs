// Tile-based frame differ feeding the SPI push

use crate::config::DifferConfig;
use crate::render::fb::Frame;

/// Axis-aligned region of the framebuffer, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn area(&self) -> usize {
        (self.w.max(0) as usize) * (self.h.max(0) as usize)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// What the run loop should transmit for this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePlan {
    /// Nothing changed; skip the send entirely.
    Unchanged,
    /// Send the listed rectangles.
    Rects(Vec<Rect>),
    /// Too much changed; resend the whole frame.
    Full,
}

/// Computes the minimum set of changed rectangles between two frames.
/// Tiles of `tile`×`tile` pixels are compared row-wise; 4-connected groups
/// of dirty tiles merge into one bounding rectangle. When the dirty area
/// ratio exceeds `full_frame_threshold` or the rectangle count exceeds
/// `max_rects`, the plan escalates to a full-frame push, which is cheaper
/// than many window setups on the panel.
#[derive(Debug)]
pub struct DirtyDiffer {
    tile: usize,
    max_rects: usize,
    full_frame_threshold: f64,
    dirty: Vec<bool>,
    visited: Vec<bool>,
    stack: Vec<usize>,
}

impl DirtyDiffer {
    pub fn new(cfg: &DifferConfig) -> Self {
        Self {
            tile: cfg.tile.max(1),
            max_rects: cfg.max_rects,
            full_frame_threshold: cfg.full_frame_threshold,
            dirty: Vec::new(),
            visited: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn diff(&mut self, cur: &Frame, prev: &Frame) -> FramePlan {
        debug_assert_eq!(cur.width, prev.width);
        debug_assert_eq!(cur.height, prev.height);

        let dirty_tiles = self.mark_dirty_tiles(cur, prev);
        if dirty_tiles == 0 {
            return FramePlan::Unchanged;
        }

        let rects = self.merge_rects(cur.width, cur.height);
        let dirty_area: usize = rects.iter().map(Rect::area).sum();
        let screen_area = cur.width * cur.height;
        let dirty_ratio = if screen_area > 0 {
            dirty_area as f64 / screen_area as f64
        } else {
            1.0
        };

        if dirty_ratio > self.full_frame_threshold || rects.len() > self.max_rects {
            FramePlan::Full
        } else {
            FramePlan::Rects(rects)
        }
    }

    /// A tile is dirty iff any of its rows differs from the previous frame.
    fn mark_dirty_tiles(&mut self, cur: &Frame, prev: &Frame) -> usize {
        let tile = self.tile;
        let tiles_x = cur.width.div_ceil(tile);
        let tiles_y = cur.height.div_ceil(tile);
        self.dirty.clear();
        self.dirty.resize(tiles_x * tiles_y, false);

        let mut count = 0;
        for ty in 0..tiles_y {
            let y0 = ty * tile;
            let y1 = (y0 + tile).min(cur.height);
            for tx in 0..tiles_x {
                let x0 = tx * tile;
                let x1 = (x0 + tile).min(cur.width);
                let mut differs = false;
                for y in y0..y1 {
                    let row = y * cur.width;
                    if cur.px[row + x0..row + x1] != prev.px[row + x0..row + x1] {
                        differs = true;
                        break;
                    }
                }
                if differs {
                    self.dirty[ty * tiles_x + tx] = true;
                    count += 1;
                }
            }
        }
        count
    }

    /// Flood-fill 4-connected dirty tile groups and emit each group's
    /// bounding rectangle, clamped to the frame.
    fn merge_rects(&mut self, width: usize, height: usize) -> Vec<Rect> {
        let tile = self.tile;
        let tiles_x = width.div_ceil(tile);
        let tiles_y = height.div_ceil(tile);
        self.visited.clear();
        self.visited.resize(self.dirty.len(), false);
        let mut rects = Vec::new();

        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let idx = ty * tiles_x + tx;
                if !self.dirty[idx] || self.visited[idx] {
                    continue;
                }

                let (mut min_tx, mut max_tx) = (tx, tx);
                let (mut min_ty, mut max_ty) = (ty, ty);
                self.visited[idx] = true;
                self.stack.clear();
                self.stack.push(idx);

                while let Some(cur_idx) = self.stack.pop() {
                    let cx = cur_idx % tiles_x;
                    let cy = cur_idx / tiles_x;
                    min_tx = min_tx.min(cx);
                    max_tx = max_tx.max(cx);
                    min_ty = min_ty.min(cy);
                    max_ty = max_ty.max(cy);

                    const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
                    for (dx, dy) in NEIGHBORS {
                        let nx = cx as i32 + dx;
                        let ny = cy as i32 + dy;
                        if nx < 0 || ny < 0 || nx as usize >= tiles_x || ny as usize >= tiles_y {
                            continue;
                        }
                        let nidx = ny as usize * tiles_x + nx as usize;
                        if self.dirty[nidx] && !self.visited[nidx] {
                            self.visited[nidx] = true;
                            self.stack.push(nidx);
                        }
                    }
                }

                let x = (min_tx * tile) as i32;
                let y = (min_ty * tile) as i32;
                let mut w = ((max_tx - min_tx + 1) * tile) as i32;
                let mut h = ((max_ty - min_ty + 1) * tile) as i32;
                if x + w > width as i32 {
                    w = width as i32 - x;
                }
                if y + h > height as i32 {
                    h = height as i32 - y;
                }
                rects.push(Rect { x, y, w, h });
            }
        }
        rects
    }
}
