//! Fixed-factor exponential smoothing and linear range mapping
//!
//! The factor is applied once per processed frame, so convergence speed depends on
//! the detection rate rather than wall-clock time.

/// Fraction of the remaining distance covered per frame
pub const SMOOTHING_FACTOR: f32 = 0.1;

/// One smoothing step: `current + (target - current) * factor`
pub fn lerp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Map `x` from `[a1, a2]` onto `[b1, b2]`. Values outside the input range extrapolate.
pub fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// A scalar that follows its target by [`lerp`] each step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    value: f32,
    factor: f32,
}

impl Smoothed {
    pub fn new(initial: f32) -> Self {
        Self::with_factor(initial, SMOOTHING_FACTOR)
    }

    pub fn with_factor(initial: f32, factor: f32) -> Self {
        Self {
            value: initial,
            factor,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Move toward `target` and return the new value
    pub fn step(&mut self, target: f32) -> f32 {
        self.value = lerp(self.value, target, self.factor);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_step() {
        let (c, t) = (0.25_f32, 1.75_f32);
        assert_eq!(lerp(c, t, SMOOTHING_FACTOR), c + (t - c) * 0.1);
    }

    #[test]
    fn test_smoothed_follows_target() {
        let mut s = Smoothed::new(6.0);
        let first = s.step(12.0);
        assert_eq!(first, 6.0 + (12.0 - 6.0) * 0.1);

        for _ in 0..200 {
            s.step(12.0);
        }
        assert!((s.value() - 12.0).abs() < 1e-4);
        // never overshoots
        assert!(s.value() <= 12.0);
    }

    #[test]
    fn test_map_linear_extrapolates() {
        assert_eq!(map_linear(0.0, 0.0, 0.3, 12.0, 3.0), 12.0);
        assert!((map_linear(0.3, 0.0, 0.3, 12.0, 3.0) - 3.0).abs() < 1e-5);
        assert!((map_linear(0.6, 0.0, 0.3, 12.0, 3.0) + 6.0).abs() < 1e-5);
        assert!((map_linear(-0.1, 0.0, 0.3, 12.0, 3.0) - 15.0).abs() < 1e-5);
    }
}
