// Animation engine: convergence, idempotence, defaults

use lcdmon::render::AnimationEngine;

#[test]
fn first_set_snaps_current_to_target() {
    let mut engine = AnimationEngine::new();
    engine.set_target("cpu", 42.0);
    assert_eq!(engine.get("cpu", 0.0), 42.0);
}

#[test]
fn missing_key_returns_default() {
    let engine = AnimationEngine::new();
    assert_eq!(engine.get("nope", 7.5), 7.5);
}

#[test]
fn converges_monotonically_toward_constant_target() {
    let mut engine = AnimationEngine::new();
    engine.set_target("v", 0.0);
    engine.set_target("v", 100.0);

    // Every dt stays under the saturation point so the step factor is in
    // (0, 1) and the approach is strictly monotone.
    let dts = [0.016, 0.2, 0.05, 0.1, 0.3, 0.016, 0.12, 0.1, 0.25, 0.05];
    let mut prev_gap = (100.0f64 - engine.get("v", 0.0)).abs();
    for _ in 0..3 {
        for &dt in &dts {
            engine.step(dt);
            let gap = (100.0f64 - engine.get("v", 0.0)).abs();
            assert!(gap < prev_gap, "gap {gap} did not shrink from {prev_gap}");
            prev_gap = gap;
        }
    }
    assert!(prev_gap < 1.0);
}

#[test]
fn large_dt_saturates_and_lands_exactly() {
    let mut engine = AnimationEngine::new();
    engine.set_target("v", 10.0);
    engine.set_target("v", 3.0);
    // Factor clamps at 1, so a huge frame gap lands on the target.
    engine.step(10.0);
    assert_eq!(engine.get("v", 0.0), 3.0);
}

#[test]
fn setting_same_target_twice_is_idempotent() {
    let mut a = AnimationEngine::new();
    let mut b = AnimationEngine::new();
    a.set_target("k", 8.0);
    b.set_target("k", 8.0);
    b.set_target("k", 8.0);
    a.step(0.1);
    b.step(0.1);
    assert_eq!(a.get("k", 0.0), b.get("k", 0.0));
}

#[test]
fn non_negative_target_never_yields_negative_current() {
    let mut engine = AnimationEngine::new();
    engine.set_target("v", 50.0);
    engine.set_target("v", 0.0);
    for _ in 0..200 {
        engine.step(0.1);
        assert!(engine.get("v", -1.0) >= 0.0);
    }
}

#[test]
fn step_moves_every_tracked_key() {
    let mut engine = AnimationEngine::new();
    engine.set_target("a", 0.0);
    engine.set_target("b", 0.0);
    engine.set_target("a", 10.0);
    engine.set_target("b", 20.0);
    engine.step(0.1);
    assert!(engine.get("a", 0.0) > 0.0);
    assert!(engine.get("b", 0.0) > engine.get("a", 0.0));
}
