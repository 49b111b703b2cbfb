// Dirty differ: coverage invariant, tile containment, escalation rules

use lcdmon::config::DifferConfig;
use lcdmon::differ::{DirtyDiffer, FramePlan, Rect};
use lcdmon::render::Frame;

fn default_cfg() -> DifferConfig {
    DifferConfig {
        tile: 16,
        max_rects: 8,
        full_frame_threshold: 0.6,
    }
}

fn covered(plan: &FramePlan, x: i32, y: i32) -> bool {
    match plan {
        FramePlan::Unchanged => false,
        FramePlan::Full => true,
        FramePlan::Rects(rects) => rects.iter().any(|r| r.contains(x, y)),
    }
}

#[test]
fn identical_frames_are_unchanged() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let a = Frame::new();
    let b = a.clone();
    assert_eq!(differ.diff(&a, &b), FramePlan::Unchanged);
}

#[test]
fn rediff_after_no_change_stays_unchanged() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let mut cur = Frame::new();
    let prev = cur.clone();
    cur.set(10, 10, 0xF800);
    assert!(matches!(differ.diff(&cur, &prev), FramePlan::Rects(_)));
    // Once buffers agree again the differ emits nothing.
    let synced = cur.clone();
    assert_eq!(differ.diff(&cur, &synced), FramePlan::Unchanged);
}

#[test]
fn single_pixel_change_stays_inside_its_tile() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    cur.set(100, 100, 0xFFFF);

    match differ.diff(&cur, &prev) {
        FramePlan::Rects(rects) => {
            assert_eq!(rects.len(), 1);
            let r = rects[0];
            assert!(r.contains(100, 100));
            // Tile 16 around (100,100) spans [96, 112).
            assert!(r.x >= 96 && r.y >= 96);
            assert!(r.x + r.w <= 112 && r.y + r.h <= 112);
        }
        other => panic!("expected rects, got {other:?}"),
    }
}

#[test]
fn every_changed_pixel_is_covered() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    let changed = [(0, 0), (5, 5), (200, 100), (479, 319), (460, 310), (33, 290)];
    for &(x, y) in &changed {
        cur.set(x, y, 0x07E0);
    }

    let plan = differ.diff(&cur, &prev);
    for &(x, y) in &changed {
        assert!(covered(&plan, x, y), "({x},{y}) not covered by {plan:?}");
    }
}

#[test]
fn adjacent_dirty_tiles_merge_into_one_rect() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    // Two horizontally adjacent tiles.
    cur.set(10, 10, 0xFFFF);
    cur.set(20, 10, 0xFFFF);

    match differ.diff(&cur, &prev) {
        FramePlan::Rects(rects) => {
            assert_eq!(rects.len(), 1);
            assert_eq!(rects[0], Rect { x: 0, y: 0, w: 32, h: 16 });
        }
        other => panic!("expected one merged rect, got {other:?}"),
    }
}

#[test]
fn majority_change_escalates_to_full_frame() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    // 61.25% of all pixels change (rows 0..196 of 320).
    cur.fill_rect(0, 0, 480, 196, 0xF800);

    assert_eq!(differ.diff(&cur, &prev), FramePlan::Full);
}

#[test]
fn too_many_rects_escalates_to_full_frame() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    // Nine isolated tiles, far apart: over the 8-rect cap.
    for i in 0..9 {
        cur.set(i * 48 + 2, (i % 5) * 64 + 2, 0xFFFF);
    }

    assert_eq!(differ.diff(&cur, &prev), FramePlan::Full);
}

#[test]
fn rect_count_at_cap_stays_partial() {
    let mut differ = DirtyDiffer::new(&default_cfg());
    let prev = Frame::new();
    let mut cur = prev.clone();
    for i in 0..8 {
        cur.set(i * 48 + 2, 2, 0xFFFF);
    }

    match differ.diff(&cur, &prev) {
        FramePlan::Rects(rects) => assert_eq!(rects.len(), 8),
        other => panic!("expected 8 rects, got {other:?}"),
    }
}

#[test]
fn rects_clamp_to_frame_bounds() {
    // 10x10 frame with tile 16: the single tile clamps to the frame.
    let cfg = DifferConfig {
        tile: 16,
        max_rects: 8,
        full_frame_threshold: 1.0,
    };
    let mut differ = DirtyDiffer::new(&cfg);
    let prev = Frame::with_size(10, 10);
    let mut cur = prev.clone();
    cur.set(9, 9, 0xFFFF);

    match differ.diff(&cur, &prev) {
        FramePlan::Rects(rects) => {
            assert_eq!(rects, vec![Rect { x: 0, y: 0, w: 10, h: 10 }]);
        }
        other => panic!("expected clamped rect, got {other:?}"),
    }
}

#[test]
fn threshold_boundary_uses_strict_greater() {
    // Exactly at the threshold: stays partial (escalation is strict >).
    let cfg = DifferConfig {
        tile: 4,
        max_rects: 64,
        full_frame_threshold: 0.25,
    };
    let mut differ = DirtyDiffer::new(&cfg);
    let prev = Frame::with_size(16, 16);
    let mut cur = prev.clone();
    // One 4x4 tile block of 16x16 = 1/16 of area; change 4 separate tiles
    // in one row: 64px dirty of 256 = exactly 0.25.
    cur.fill_rect(0, 0, 16, 4, 0xFFFF);
    match differ.diff(&cur, &prev) {
        FramePlan::Rects(_) => {}
        other => panic!("expected rects at exact threshold, got {other:?}"),
    }
}
