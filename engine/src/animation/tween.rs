//! Per-value tween records.
//!
//! A tween is `{start, target, elapsed, duration, easing}` advanced by the
//! frame loop's delta-time. Cancelling an in-flight tween is replacing it
//! (usually with one starting from the current value), which keeps reversal
//! free of overshoot.

/// Easing curve applied to normalized tween progress.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Easing {
    /// Constant-rate interpolation
    #[default]
    Linear,
    /// Hermite smoothstep, gentle in and out
    SmoothStep,
}

impl Easing {
    /// Apply the curve to a normalized progress value in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A single animated scalar moving from `start` to `target` over `duration`
/// seconds.
///
/// The value is strictly monotonic toward the target and lands on it exactly
/// when the duration elapses.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
    start: f32,
    target: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl Tween {
    /// Create a tween. A non-positive duration completes on the first
    /// `advance` call.
    pub fn new(start: f32, target: f32, duration: f32, easing: Easing) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Advance by `dt` seconds and return the current value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    /// Current value without advancing.
    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return self.target;
        }
        let t = self.easing.apply(self.elapsed / self.duration);
        self.start + (self.target - self.start) * t
    }

    /// Target value this tween is heading toward.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the tween has reached its target.
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Replace this tween with one running from the current value toward a
    /// new target. This is the cancel-and-reverse operation: no overshoot,
    /// no stacking.
    pub fn retarget(&self, target: f32, duration: f32) -> Tween {
        Tween::new(self.value(), target, duration, self.easing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_reaches_target_exactly() {
        let mut tween = Tween::new(0.0, 1.0, 0.1, Easing::Linear);
        for _ in 0..20 {
            tween.advance(0.016);
        }
        assert_eq!(tween.value(), 1.0);
        assert!(tween.is_done());
    }

    #[test]
    fn test_tween_monotonic() {
        let mut tween = Tween::new(0.0, 2.0, 0.1, Easing::SmoothStep);
        let mut last = tween.value();
        for _ in 0..50 {
            let v = tween.advance(0.005);
            assert!(v >= last, "tween moved away from target");
            last = v;
        }
    }

    #[test]
    fn test_tween_reverse_mid_flight() {
        let mut raise = Tween::new(0.0, 1.0, 0.1, Easing::Linear);
        raise.advance(0.05);
        let mid = raise.value();
        assert!(mid > 0.0 && mid < 1.0);

        // Hover flips: replace with the reverse tween from the current value
        let mut lower = raise.retarget(0.0, 0.1);
        for _ in 0..20 {
            let v = lower.advance(0.016);
            assert!((0.0..=mid).contains(&v), "overshoot: {v}");
        }
        assert_eq!(lower.value(), 0.0);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut tween = Tween::new(3.0, 5.0, 0.0, Easing::Linear);
        assert_eq!(tween.advance(0.0), 5.0);
        assert!(tween.is_done());
    }
}
