//! Animation Module
//!
//! Explicit, inspectable animation state advanced by frame delta-time.
//! There is no callback scheduler: a [`Tween`] is a plain record the frame
//! loop drives, and cancelling one means replacing or dropping it.

mod tween;

pub use tween::{Easing, Tween};

/// A minimal deterministic pseudo-random number generator using the xorshift32
/// algorithm. Given the same seed, it always produces the same sequence.
///
/// Used for per-cell transition phases and per-cell color jitter, so a fixed
/// seed reproduces the exact same wave in tests.
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed. A seed of 0 is bumped to 1
    /// because xorshift32 requires a non-zero state.
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Advance the state and return the next pseudo-random `u32`.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Return a pseudo-random `f32` in `[0.0, 1.0)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Return a pseudo-random `f32` in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Linearly remap `v` from `[in_min, in_max]` to `[out_min, out_max]`,
/// without clamping.
pub fn map_range(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + ((v - in_min) / (in_max - in_min)) * (out_max - out_min)
}

/// Per-cell staggered progress for the transition wave.
///
/// A global progress `v` in `[0, 1]` is pushed through the cell's random
/// `phase` in `[0, 1)`: the cell stays at `from` until `v` passes its phase,
/// then runs linearly and reaches `to` exactly at `v = 1` regardless of
/// phase. The result is always inside the `[from, to]` interval, so the wave
/// is bounded and terminates deterministically.
pub fn stagger(v: f32, phase: f32, from: f32, to: f32) -> f32 {
    let lo = from.min(to);
    let hi = from.max(to);
    map_range(v, phase, 1.0, from, to).clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_rng_f32_range() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_map_range() {
        assert!((map_range(0.5, 0.0, 1.0, -6.0, 0.0) - (-3.0)).abs() < 1e-6);
        assert!((map_range(2.0, 0.0, 4.0, 0.0, 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stagger_endpoints_exact() {
        for phase in [0.0, 0.25, 0.5, 0.99] {
            assert_eq!(stagger(1.0, phase, -6.0, 0.0), 0.0);
            assert_eq!(stagger(0.0, phase, -6.0, 0.0), -6.0);
            // Reversed interval (outgoing: 0 -> 4)
            assert_eq!(stagger(1.0, phase, 0.0, 4.0), 4.0);
            assert_eq!(stagger(0.0, phase, 0.0, 4.0), 0.0);
        }
    }

    #[test]
    fn test_stagger_bounded() {
        let mut rng = SimpleRng::new(3);
        for _ in 0..200 {
            let phase = rng.next_f32();
            let v = rng.next_f32();
            let z = stagger(v, phase, -6.0, 0.0);
            assert!((-6.0..=0.0).contains(&z));
        }
    }

    #[test]
    fn test_stagger_holds_until_phase() {
        // Cell with phase 0.8 must still be at the start value at v = 0.5
        assert_eq!(stagger(0.5, 0.8, -6.0, 0.0), -6.0);
    }
}
