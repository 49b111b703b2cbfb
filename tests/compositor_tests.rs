// Pixel primitives: clipping, shapes, gradients, gauges

use lcdmon::render::color::rgb;
use lcdmon::render::gauge;
use lcdmon::render::{Frame, luts};

const INK: u16 = 0xFFFF;
const TRACK: u16 = 0x39E7;

#[test]
fn set_and_get_respect_bounds() {
    let mut f = Frame::with_size(8, 8);
    f.set(7, 7, INK);
    assert_eq!(f.get(7, 7), Some(INK));
    // Out-of-range writes are dropped, reads return None.
    f.set(8, 0, INK);
    f.set(0, 8, INK);
    f.set(-1, 0, INK);
    assert_eq!(f.get(8, 0), None);
    assert_eq!(f.get(-1, 0), None);
    assert!(f.px.iter().filter(|&&p| p == INK).count() == 1);
}

#[test]
fn fill_rect_clips_to_frame() {
    let mut f = Frame::with_size(10, 10);
    f.fill_rect(-5, -5, 8, 8, INK);
    // Only the intersection [0,3)x[0,3) is painted.
    for y in 0..10 {
        for x in 0..10 {
            let expected = x < 3 && y < 3;
            assert_eq!(f.get(x, y) == Some(INK), expected, "({x},{y})");
        }
    }

    let mut g = Frame::with_size(10, 10);
    g.fill_rect(20, 20, 5, 5, INK);
    assert!(g.px.iter().all(|&p| p == 0));
    g.fill_rect(2, 2, 0, 5, INK);
    assert!(g.px.iter().all(|&p| p == 0));
}

#[test]
fn line_covers_both_endpoints() {
    let mut f = Frame::with_size(20, 20);
    f.line(2, 3, 15, 11, INK);
    assert_eq!(f.get(2, 3), Some(INK));
    assert_eq!(f.get(15, 11), Some(INK));
    // Every column between the endpoints is touched.
    for x in 2..=15 {
        assert!((0..20).any(|y| f.get(x, y) == Some(INK)), "column {x}");
    }
}

#[test]
fn vertical_and_horizontal_lines() {
    let mut f = Frame::with_size(10, 10);
    f.line(4, 1, 4, 8, INK);
    for y in 1..=8 {
        assert_eq!(f.get(4, y), Some(INK));
    }
    f.line(1, 6, 8, 6, TRACK);
    for x in 1..=8 {
        assert_eq!(f.get(x, 6), Some(TRACK));
    }
}

#[test]
fn filled_circle_matches_euclidean_disc() {
    let mut f = Frame::with_size(30, 30);
    f.filled_circle(15, 15, 6, INK);
    assert_eq!(f.get(15, 15), Some(INK));
    assert_eq!(f.get(21, 15), Some(INK));
    assert_eq!(f.get(15, 9), Some(INK));
    for y in 0..30 {
        for x in 0..30 {
            let dx = (x - 15) as f64;
            let dy = (y - 15) as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if f.get(x, y) == Some(INK) {
                assert!(dist <= 6.0 + 1e-9, "({x},{y}) outside radius");
            } else {
                assert!(dist > 5.0, "({x},{y}) hole inside disc");
            }
        }
    }
}

#[test]
fn filled_circle_clips_at_edges() {
    let mut f = Frame::with_size(10, 10);
    f.filled_circle(0, 0, 5, INK);
    assert_eq!(f.get(0, 0), Some(INK));
    // No wraparound artifacts on the far side.
    assert_eq!(f.get(9, 9), Some(0));
}

#[test]
fn circle_outline_stays_on_ring() {
    let mut f = Frame::with_size(30, 30);
    f.circle(15, 15, 8, INK);
    let mut count = 0;
    for y in 0..30 {
        for x in 0..30 {
            if f.get(x, y) == Some(INK) {
                let dx = (x - 15) as f64;
                let dy = (y - 15) as f64;
                let dist = (dx * dx + dy * dy).sqrt();
                assert!((dist - 8.0).abs() < 1.5, "({x},{y}) off ring: {dist}");
                count += 1;
            }
        }
    }
    assert!(count > 16, "ring too sparse: {count}");
}

#[test]
fn rounded_rect_fills_center_and_spares_corners() {
    let mut f = Frame::with_size(40, 30);
    let fill = rgb(0, 255, 0);
    let border = rgb(255, 0, 0);
    f.rounded_rect(5, 5, 30, 20, 8, fill, border);
    assert_eq!(f.get(20, 15), Some(fill));
    // Sharp corner of the bounding box is outside the rounded shape.
    assert_eq!(f.get(5, 5), Some(0));
    // Edge midpoints carry the border color.
    assert_eq!(f.get(20, 5), Some(border));
    assert_eq!(f.get(5, 15), Some(border));
}

#[test]
fn v_gradient_interpolates_rows() {
    let mut f = Frame::with_size(4, 10);
    let top = rgb(0, 0, 0);
    let bottom = rgb(255, 255, 255);
    f.v_gradient(0, 0, 4, 10, top, bottom);
    assert_eq!(f.get(0, 0), Some(top));
    assert_eq!(f.get(0, 9), Some(bottom));
    let mid = f.get(0, 5).unwrap();
    assert!(mid != top && mid != bottom);
}

#[test]
fn grid_draws_cell_lines() {
    let mut f = Frame::with_size(20, 20);
    f.grid(0, 0, 20, 20, 5, 0, 0, INK);
    for k in [0, 5, 10, 15] {
        assert_eq!(f.get(k, 7), Some(INK), "vertical at {k}");
        assert_eq!(f.get(7, k), Some(INK), "horizontal at {k}");
    }
    assert_eq!(f.get(7, 7), Some(0));
}

#[test]
fn semi_gauge_progress_controls_active_arc() {
    luts::init();
    let mut empty = Frame::with_size(100, 60);
    gauge::semi_gauge(&mut empty, 50, 50, 30, 8, 0.0, INK, TRACK);
    assert!(!empty.px.contains(&INK), "frac=0 painted active pixels");
    assert!(empty.px.contains(&TRACK), "track missing");

    let mut full = Frame::with_size(100, 60);
    gauge::semi_gauge(&mut full, 50, 50, 30, 8, 1.0, INK, TRACK);
    let active = full.px.iter().filter(|&&p| p == INK).count();
    assert!(active > 50, "full sweep too sparse: {active}");
    // Top-half gauge: nothing below the center row besides caps.
    for y in 56..60 {
        for x in 0..100 {
            assert_ne!(full.get(x, y), Some(INK), "active pixel below gauge at ({x},{y})");
        }
    }
}

#[test]
fn ring_gauge_draws_track_caps_and_inner_disc() {
    luts::init();
    let mut f = Frame::with_size(100, 100);
    let inner = rgb(40, 40, 40);
    gauge::ring_gauge(&mut f, 50, 50, 30, 8, 0.5, INK, TRACK, Some(inner));
    assert!(f.px.contains(&INK));
    assert!(f.px.contains(&TRACK));
    assert_eq!(f.get(50, 50), Some(inner));
    // Half sweep from twelve o'clock: the right mid-band is active.
    let right_mid_active = (73..=80).any(|x| f.get(x, 50) == Some(INK));
    assert!(right_mid_active, "no active pixels on the right mid-band");
}

#[test]
fn gauge_pixels_stay_near_the_ring() {
    luts::init();
    let mut f = Frame::with_size(120, 120);
    gauge::ring_gauge(&mut f, 60, 60, 40, 6, 0.75, INK, TRACK, None);
    for y in 0..120 {
        for x in 0..120 {
            if f.get(x, y) == Some(INK) || f.get(x, y) == Some(TRACK) {
                let dx = (x - 60) as f64;
                let dy = (y - 60) as f64;
                let dist = (dx * dx + dy * dy).sqrt();
                assert!(
                    (30.0..=43.0).contains(&dist),
                    "({x},{y}) at distance {dist} is off the ring band"
                );
            }
        }
    }
}
