// RGB565 color math properties

use lcdmon::render::color::{from_rgb888, interpolate, rgb, scale, to_rgb888};

#[test]
fn rgb888_roundtrip_is_identity_for_all_inputs() {
    for c in 0..=u16::MAX {
        let (r, g, b) = to_rgb888(c);
        assert_eq!(from_rgb888(r, g, b), c, "roundtrip failed for {c:#06x}");
    }
}

#[test]
fn interpolate_is_identity_on_equal_endpoints() {
    let colors = [0x0000, 0xFFFF, rgb(10, 200, 31), rgb(255, 0, 128)];
    for &c in &colors {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert_eq!(interpolate(c, c, t), c);
        }
    }
}

#[test]
fn interpolate_hits_exact_endpoints() {
    let a = rgb(20, 40, 60);
    let b = rgb(200, 100, 250);
    assert_eq!(interpolate(a, b, 0.0), a);
    assert_eq!(interpolate(a, b, 1.0), b);
}

#[test]
fn interpolate_midpoint_lands_between() {
    let a = rgb(0, 0, 0);
    let b = rgb(255, 255, 255);
    let mid = interpolate(a, b, 0.5);
    let (r, g, bl) = to_rgb888(mid);
    assert!((100..=160).contains(&r));
    assert!((100..=160).contains(&g));
    assert!((100..=160).contains(&bl));
}

#[test]
fn scale_clamps_channels() {
    assert_eq!(scale(0xFFFF, 2.0), 0xFFFF);
    assert_eq!(scale(0xFFFF, 1.0), 0xFFFF);
    assert_eq!(scale(rgb(100, 100, 100), 0.0), 0x0000);
    assert_eq!(scale(0x0000, 5.0), 0x0000);
}

#[test]
fn scale_halves_roughly() {
    let c = rgb(200, 200, 200);
    let (r0, g0, b0) = to_rgb888(c);
    let (r, g, b) = to_rgb888(scale(c, 0.5));
    assert!(r < r0 && g < g0 && b < b0);
    assert!(r as i32 >= r0 as i32 / 2 - 16);
}

#[test]
fn packing_matches_known_values() {
    assert_eq!(rgb(255, 0, 0), 0xF800);
    assert_eq!(rgb(0, 255, 0), 0x07E0);
    assert_eq!(rgb(0, 0, 255), 0x001F);
    assert_eq!(rgb(255, 255, 255), 0xFFFF);
}
