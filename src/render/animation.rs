// Named scalar interpolators stepped once per frame

use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct AnimatedValue {
    current: f64,
    target: f64,
}

/// Keyed value smoother. Each entry approaches its target with a
/// dt-proportional but saturating step, so the approach is approximately
/// exponential and clamped per frame; this is not strictly frame-rate
/// independent and is kept as-is.
#[derive(Debug)]
pub struct AnimationEngine {
    values: HashMap<String, AnimatedValue>,
    interpolation_speed: f64,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            interpolation_speed: 0.3,
        }
    }

    /// First use of a key snaps current to the target; later calls only
    /// move the target.
    pub fn set_target(&mut self, key: &str, target: f64) {
        match self.values.get_mut(key) {
            Some(v) => v.target = target,
            None => {
                self.values.insert(
                    key.to_string(),
                    AnimatedValue {
                        current: target,
                        target,
                    },
                );
            }
        }
    }

    /// Advance every entry by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let factor = (self.interpolation_speed * dt * 10.0).min(1.0);
        for v in self.values.values_mut() {
            let mut next = v.current + (v.target - v.current) * factor;
            // A non-negative target must never produce a negative reading.
            if v.target >= 0.0 && next < 0.0 {
                next = 0.0;
            }
            v.current = next;
        }
    }

    pub fn get(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).map_or(default, |v| v.current)
    }
}
