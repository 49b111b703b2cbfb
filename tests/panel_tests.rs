// Panel wire-format helpers: window programming and pixel encoding

use lcdmon::panel::{clamp_rect, encode_rgb666, window_bytes};
use lcdmon::render::color::rgb;

#[test]
fn window_bytes_are_big_endian_inclusive() {
    assert_eq!(window_bytes(0x0123, 0x0456), [0x01, 0x23, 0x04, 0x56]);
    assert_eq!(window_bytes(0, 479), [0x00, 0x00, 0x01, 0xDF]);
}

#[test]
fn window_bytes_apply_panel_offsets() {
    // The driver shifts both endpoints by the configured offset before
    // encoding; a (0,0,16,16) rect with offset 2 programs 2..=17.
    let (x0, _y0, w, _h) = clamp_rect(0, 0, 16, 16).unwrap();
    let start = (x0 as u16) + 2;
    let end = (x0 + w - 1) as u16 + 2;
    assert_eq!(window_bytes(start, end), [0x00, 0x02, 0x00, 0x11]);
}

#[test]
fn clamp_keeps_in_bounds_rect() {
    assert_eq!(clamp_rect(10, 20, 30, 40), Some((10, 20, 30, 40)));
}

#[test]
fn clamp_trims_negative_origin() {
    assert_eq!(clamp_rect(-5, -7, 20, 20), Some((0, 0, 15, 13)));
}

#[test]
fn clamp_trims_overflow_and_rejects_empty() {
    assert_eq!(clamp_rect(470, 310, 100, 100), Some((470, 310, 10, 10)));
    assert_eq!(clamp_rect(480, 0, 10, 10), None);
    assert_eq!(clamp_rect(0, 320, 10, 10), None);
    assert_eq!(clamp_rect(10, 10, 0, 5), None);
    assert_eq!(clamp_rect(10, 10, 5, -1), None);
}

#[test]
fn rgb666_encoding_is_three_shifted_bytes_per_pixel() {
    let mut out = Vec::new();

    encode_rgb666(&[0xFFFF], &mut out);
    assert_eq!(out, vec![0xF8, 0xFC, 0xF8]);

    encode_rgb666(&[0x0000], &mut out);
    assert_eq!(out, vec![0, 0, 0]);

    // r5=10 g6=20 b5=5 → bytes are the channels shifted into 8-bit slots.
    let px = ((10u16) << 11) | ((20u16) << 5) | 5;
    encode_rgb666(&[px], &mut out);
    assert_eq!(out, vec![10 << 3, 20 << 2, 5 << 3]);
}

#[test]
fn rgb666_payload_length_and_order() {
    let src: Vec<u16> = vec![rgb(255, 0, 0), rgb(0, 255, 0), rgb(0, 0, 255)];
    let mut out = Vec::new();
    encode_rgb666(&src, &mut out);
    assert_eq!(out.len(), 3 * src.len());
    assert_eq!(&out[0..3], &[0xF8, 0x00, 0x00]);
    assert_eq!(&out[3..6], &[0x00, 0xFC, 0x00]);
    assert_eq!(&out[6..9], &[0x00, 0x00, 0xF8]);
}

#[test]
fn encode_reuses_buffer_without_accumulating() {
    let mut out = Vec::new();
    encode_rgb666(&[0xFFFF; 4], &mut out);
    assert_eq!(out.len(), 12);
    encode_rgb666(&[0x0000; 2], &mut out);
    assert_eq!(out.len(), 6);
}
