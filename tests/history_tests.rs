// History rings and network smoothing

use lcdmon::render::history::{Ema, HistoryRing, capacity_for_width};

#[test]
fn length_is_min_of_pushes_and_capacity() {
    let mut ring = HistoryRing::new(120);
    for k in 1..=300u32 {
        ring.push(k as f64);
        assert_eq!(ring.len(), (k as usize).min(120));
    }
}

#[test]
fn newest_sample_sits_at_the_end() {
    let mut ring = HistoryRing::new(5);
    for v in 0..7 {
        ring.push(v as f64);
        assert_eq!(ring.last(), Some(v as f64));
    }
    assert_eq!(ring.get(ring.len() - 1), Some(6.0));
}

#[test]
fn oldest_samples_drop_first() {
    let mut ring = HistoryRing::new(120);
    for v in 0..130 {
        ring.push(v as f64);
    }
    assert_eq!(ring.get(0), Some(10.0));
    let collected: Vec<f64> = ring.iter().collect();
    assert_eq!(collected.len(), 120);
    assert!(collected.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn min_max_tracks_contents() {
    let mut ring = HistoryRing::new(4);
    assert_eq!(ring.min_max(), None);
    ring.push(5.0);
    ring.push(-2.0);
    ring.push(9.0);
    assert_eq!(ring.min_max(), Some((-2.0, 9.0)));
}

#[test]
fn capacity_follows_display_width() {
    assert_eq!(capacity_for_width(480), 120);
    assert_eq!(capacity_for_width(400), 120);
    assert_eq!(capacity_for_width(320), 60);
}

#[test]
fn ema_seeds_from_first_observation() {
    let mut ema = Ema::new(0.3);
    assert_eq!(ema.apply(100.0), 100.0);
    // 0.3 * 0 + 0.7 * 100
    let second = ema.apply(0.0);
    assert!((second - 70.0).abs() < 1e-12);
    let third = ema.apply(0.0);
    assert!((third - 49.0).abs() < 1e-12);
}

#[test]
fn ema_converges_to_constant_input() {
    let mut ema = Ema::new(0.3);
    ema.apply(0.0);
    let mut last = 0.0;
    for _ in 0..100 {
        last = ema.apply(50.0);
    }
    assert!((last - 50.0).abs() < 1e-6);
}
