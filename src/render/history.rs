// Bounded sample histories behind the charts

use std::collections::VecDeque;

/// Fixed-capacity ordered sequence of recent samples, oldest first. When
/// full, a push drops the oldest sample.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    buf: VecDeque<f64>,
    cap: usize,
}

impl HistoryRing {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, v: f64) {
        if self.buf.len() >= self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(v);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.buf.get(i).copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.buf.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut it = self.buf.iter().copied();
        let first = it.next()?;
        let mut lo = first;
        let mut hi = first;
        for v in it {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        Some((lo, hi))
    }
}

/// History capacity scales with the plot width the panel can show.
pub fn capacity_for_width(display_width: usize) -> usize {
    if display_width >= 400 { 120 } else { 60 }
}

/// Exponential moving average, seeded from the first observation. Applied
/// to the network channels before their history pushes so bursty counters
/// chart smoothly.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    alpha: f64,
    state: Option<f64>,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    pub fn apply(&mut self, raw: f64) -> f64 {
        let next = match self.state {
            None => raw,
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
        };
        self.state = Some(next);
        next
    }
}
