// Environment configuration: defaults, parsing, normalization, validation

use std::collections::HashMap;

use lcdmon::config::AppConfig;

fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::load_with(move |name| map.get(name).cloned())
}

#[test]
fn defaults_without_environment() {
    let cfg = load(&[]).expect("defaults load");
    assert_eq!(cfg.render.target_fps, 5);
    assert_eq!(cfg.render.idle_fps, 3);
    assert_eq!(cfg.render.anim_burst_frames, 5);
    assert_eq!(cfg.differ.tile, 16);
    assert_eq!(cfg.differ.max_rects, 8);
    assert!((cfg.differ.full_frame_threshold - 0.6).abs() < 1e-12);
    assert_eq!(cfg.spi.speed_hz, 16_000_000);
    assert_eq!(cfg.spi.chunk_bytes, 1024 - 1024 % 3);
    assert_eq!(cfg.spi.throttle_us, 0);
    assert_eq!(cfg.ui.theme, "neutral");
    assert_eq!(cfg.net.if1, "eth0");
    assert_eq!(cfg.net.if2, "eth1");
    assert!((cfg.net.autoscale_pctl - 95.0).abs() < 1e-12);
    assert_eq!(cfg.wg.active_window_s, 120);
    assert_eq!(cfg.rcon.port, 25575);
    assert_eq!(cfg.rcon.interval_ms, 2000);
    assert_eq!(cfg.printer.poll_ms, 5000);
}

#[test]
fn explicit_values_override_defaults() {
    let cfg = load(&[
        ("TARGET_FPS", "10"),
        ("DIRTY_TILE", "32"),
        ("THEME", "neon"),
        ("NET_IF1", "enp3s0"),
        ("MC_RCON_PASS", "secret"),
        ("PRINTER_POLL_MS", "2500"),
    ])
    .unwrap();
    assert_eq!(cfg.render.target_fps, 10);
    assert_eq!(cfg.differ.tile, 32);
    assert_eq!(cfg.ui.theme, "neon");
    assert_eq!(cfg.net.if1, "enp3s0");
    assert_eq!(cfg.rcon.password, "secret");
    assert_eq!(cfg.printer.poll_ms, 2500);
}

#[test]
fn unparseable_values_fall_back_to_defaults() {
    let cfg = load(&[("TARGET_FPS", "fast"), ("FULL_FRAME_THRESHOLD", "lots")]).unwrap();
    assert_eq!(cfg.render.target_fps, 5);
    assert!((cfg.differ.full_frame_threshold - 0.6).abs() < 1e-12);
}

#[test]
fn spi_speed_clamps_to_panel_maximum() {
    let cfg = load(&[("SPI_SPEED_HZ", "40000000")]).unwrap();
    assert_eq!(cfg.spi.speed_hz, 24_000_000);
}

#[test]
fn spi_chunk_normalizes_to_pixel_multiples() {
    assert_eq!(load(&[("SPI_CHUNK", "1000")]).unwrap().spi.chunk_bytes, 999);
    assert_eq!(load(&[("SPI_CHUNK", "2")]).unwrap().spi.chunk_bytes, 3);
    assert_eq!(load(&[("SPI_CHUNK", "0")]).unwrap().spi.chunk_bytes, 3);
    assert_eq!(load(&[("SPI_CHUNK", "3072")]).unwrap().spi.chunk_bytes, 3072);
}

#[test]
fn boolean_parsing_accepts_common_forms() {
    for v in ["1", "true", "yes", "on"] {
        assert!(load(&[("NET_AUTOSCALE", v)]).unwrap().net.autoscale, "{v}");
    }
    for v in ["0", "false", "no", "off"] {
        assert!(!load(&[("NET_AUTOSCALE", v)]).unwrap().net.autoscale, "{v}");
    }
    // Unknown token keeps the default (on for smoothing).
    assert!(load(&[("SPARKLINE_SMOOTH", "maybe")]).unwrap().spark.smooth);
}

#[test]
fn zero_fps_is_rejected() {
    let err = load(&[("TARGET_FPS", "0")]).unwrap_err();
    assert!(err.to_string().contains("TARGET_FPS"));
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let err = load(&[("FULL_FRAME_THRESHOLD", "1.5")]).unwrap_err();
    assert!(err.to_string().contains("FULL_FRAME_THRESHOLD"));
}

#[test]
fn bad_smoothing_alpha_is_rejected() {
    let err = load(&[("SPARKLINE_SMOOTH_ALPHA", "0")]).unwrap_err();
    assert!(err.to_string().contains("SPARKLINE_SMOOTH_ALPHA"));
}

#[test]
fn inverted_autoscale_bounds_are_rejected() {
    let err = load(&[("NET_AUTOSCALE_MIN", "100"), ("NET_AUTOSCALE_MAX", "50")]).unwrap_err();
    assert!(err.to_string().contains("NET_AUTOSCALE_MIN"));
}
