use std::f32::consts::TAU;

/// Largest `f32` strictly below `1.0`.
const PHASE_MAX: f32 = 1.0 - f32::EPSILON / 2.0;

/// Cyclic animation clock over a fixed period.
///
/// Stateless apart from the period: every query reduces the absolute time with
/// a single modulo, so long sessions never accumulate drift and wraparound is
/// exact.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationClock {
    period_ms: u64,
}

impl AnimationClock {
    /// Creates a clock. A zero period is raised to 1 ms.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
        }
    }

    #[inline]
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Position within the cycle, in `[0, 1)`.
    #[inline]
    pub fn phase(&self, now_ms: u64) -> f32 {
        phase(now_ms, self.period_ms)
    }

    /// `phase * 360`, in `[0, 360)`.
    #[inline]
    pub fn angle_degrees(&self, now_ms: u64) -> f32 {
        angle_degrees(now_ms, self.period_ms)
    }

    /// `phase * 2π`, in `[0, 2π)`.
    #[inline]
    pub fn angle_radians(&self, now_ms: u64) -> f32 {
        self.phase(now_ms) * TAU
    }
}

/// `(now mod period) / period`, in `[0, 1)`.
pub fn phase(now_ms: u64, period_ms: u64) -> f32 {
    let period = period_ms.max(1);
    let p = ((now_ms % period) as f64 / period as f64) as f32;
    // Rounding to f32 can land on 1.0 for periods longer than f32 precision.
    p.min(PHASE_MAX)
}

/// `phase * 360`, in `[0, 360)`.
pub fn angle_degrees(now_ms: u64, period_ms: u64) -> f32 {
    (phase(now_ms, period_ms) * 360.0).min(360.0 * PHASE_MAX)
}
