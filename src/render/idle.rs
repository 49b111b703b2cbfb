// Idle detection and the dashboard dim transition

use std::time::Instant;

use crate::models::MetricsSnapshot;

const IDLE_THRESHOLD_S: f64 = 30.0;
const TRANSITION_TAU_S: f64 = 0.3;

/// Decides whether the host is idle (sustained low activity) and drives a
/// frame-rate-independent transition progress in [0, 1] used to dim the
/// scene and drop the frame rate.
#[derive(Debug)]
pub struct IdleController {
    is_idle: bool,
    idle_since: Option<Instant>,
    progress: f64,
}

impl IdleController {
    pub fn new() -> Self {
        Self {
            is_idle: false,
            idle_since: None,
            progress: 0.0,
        }
    }

    pub fn update(&mut self, snapshot: &MetricsSnapshot, dt: f64, now: Instant) {
        let system_is_idle = snapshot.cpu_pct < 10.0
            && snapshot.temp_c < 50.0
            && snapshot.net1_mbps < 10.0
            && snapshot.net2_mbps < 10.0;

        if system_is_idle {
            let since = *self.idle_since.get_or_insert(now);
            if now.saturating_duration_since(since).as_secs_f64() > IDLE_THRESHOLD_S {
                self.is_idle = true;
            }
        } else {
            self.idle_since = None;
            self.is_idle = false;
        }

        let target = if self.is_idle { 1.0 } else { 0.0 };
        let alpha = 1.0 - (-dt / TRANSITION_TAU_S).exp();
        self.progress = (self.progress + (target - self.progress) * alpha).clamp(0.0, 1.0);
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    pub fn transition_progress(&self) -> f64 {
        self.progress
    }
}

impl Default for IdleController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn busy() -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_pct: 80.0,
            ..MetricsSnapshot::default()
        }
    }

    fn quiet() -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_pct: 2.0,
            temp_c: 40.0,
            ..MetricsSnapshot::default()
        }
    }

    #[test]
    fn idle_needs_sustained_quiet() {
        let mut c = IdleController::new();
        let t0 = Instant::now();
        c.update(&quiet(), 0.2, t0);
        assert!(!c.is_idle());
        c.update(&quiet(), 0.2, t0 + Duration::from_secs(29));
        assert!(!c.is_idle());
        c.update(&quiet(), 0.2, t0 + Duration::from_secs(31));
        assert!(c.is_idle());
    }

    #[test]
    fn activity_resets_the_timer() {
        let mut c = IdleController::new();
        let t0 = Instant::now();
        c.update(&quiet(), 0.2, t0);
        c.update(&busy(), 0.2, t0 + Duration::from_secs(20));
        c.update(&quiet(), 0.2, t0 + Duration::from_secs(21));
        c.update(&quiet(), 0.2, t0 + Duration::from_secs(45));
        assert!(!c.is_idle());
    }

    #[test]
    fn transition_converges_and_stays_clamped() {
        let mut c = IdleController::new();
        let t0 = Instant::now();
        for i in 0..400u64 {
            c.update(&quiet(), 0.2, t0 + Duration::from_millis(200 * i));
        }
        assert!(c.is_idle());
        assert!(c.transition_progress() > 0.99 && c.transition_progress() <= 1.0);
    }
}
