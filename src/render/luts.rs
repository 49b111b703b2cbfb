// Acceleration tables for the pixel hot loops

use std::sync::LazyLock;

const EXP_SIZE: usize = 512;
const EXP_MAX: f64 = 8.0;
const TRIG_SIZE: usize = 1024;
const TWO_PI: f64 = std::f64::consts::TAU;

struct Luts {
    exp: [f32; EXP_SIZE],
    sin: [f32; TRIG_SIZE],
    cos: [f32; TRIG_SIZE],
}

static LUTS: LazyLock<Luts> = LazyLock::new(|| {
    let mut exp = [0.0f32; EXP_SIZE];
    for (i, e) in exp.iter_mut().enumerate() {
        let x = (i as f64 / (EXP_SIZE - 1) as f64) * EXP_MAX;
        *e = (-x).exp() as f32;
    }
    let mut sin = [0.0f32; TRIG_SIZE];
    let mut cos = [0.0f32; TRIG_SIZE];
    for i in 0..TRIG_SIZE {
        let a = (i as f64 / (TRIG_SIZE - 1) as f64) * TWO_PI;
        sin[i] = a.sin() as f32;
        cos[i] = a.cos() as f32;
    }
    Luts { exp, sin, cos }
});

/// Force table construction before the first frame so the render path has
/// no lazy-init branch contention.
pub fn init() {
    LazyLock::force(&LUTS);
}

/// exp(-x) over x in [0, 8], linearly interpolated; 0 beyond the table.
pub fn fast_exp(x: f64) -> f32 {
    if x <= 0.0 {
        return 1.0;
    }
    if x >= EXP_MAX {
        return 0.0;
    }
    let idx_f = (x / EXP_MAX) * (EXP_SIZE - 1) as f64;
    let idx = idx_f as usize;
    if idx >= EXP_SIZE - 1 {
        return LUTS.exp[EXP_SIZE - 1];
    }
    let t = (idx_f - idx as f64) as f32;
    LUTS.exp[idx] * (1.0 - t) + LUTS.exp[idx + 1] * t
}

fn normalize(angle: f64) -> f64 {
    let mut a = angle - (angle / TWO_PI).floor() * TWO_PI;
    if a < 0.0 {
        a += TWO_PI;
    }
    a
}

/// sin over any angle, table lookup with linear interpolation.
pub fn fast_sin(angle: f64) -> f32 {
    let idx_f = (normalize(angle) / TWO_PI) * (TRIG_SIZE - 1) as f64;
    let idx = idx_f as usize;
    if idx >= TRIG_SIZE - 1 {
        return LUTS.sin[0];
    }
    let t = (idx_f - idx as f64) as f32;
    LUTS.sin[idx] * (1.0 - t) + LUTS.sin[idx + 1] * t
}

/// cos over any angle, table lookup with linear interpolation.
pub fn fast_cos(angle: f64) -> f32 {
    let idx_f = (normalize(angle) / TWO_PI) * (TRIG_SIZE - 1) as f64;
    let idx = idx_f as usize;
    if idx >= TRIG_SIZE - 1 {
        return LUTS.cos[0];
    }
    let t = (idx_f - idx as f64) as f32;
    LUTS.cos[idx] * (1.0 - t) + LUTS.cos[idx + 1] * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_matches_reference_within_tolerance() {
        for i in 0..200 {
            let x = i as f64 * 0.04;
            let got = fast_exp(x) as f64;
            let want = (-x).exp();
            assert!((got - want).abs() < 1e-3, "x={x} got={got} want={want}");
        }
        assert_eq!(fast_exp(-1.0), 1.0);
        assert_eq!(fast_exp(9.0), 0.0);
    }

    #[test]
    fn trig_matches_reference_and_wraps() {
        for i in 0..100 {
            let a = i as f64 * 0.17 - 6.0;
            assert!((fast_sin(a) as f64 - a.sin()).abs() < 5e-3, "sin({a})");
            assert!((fast_cos(a) as f64 - a.cos()).abs() < 5e-3, "cos({a})");
        }
    }
}
