//! Fixed-duration eased transitions.
//!
//! Views don't run a clock. A transition is sampled into frames up front and
//! the caller plays them back at the frame interval.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cubic ease-in-out over `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A transition of fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(with = "crate::config::duration_serde")]
    pub duration: Duration,
    #[serde(with = "crate::config::duration_serde")]
    pub frame_interval: Duration,
}

impl Transition {
    pub fn new(duration: Duration, frame_interval: Duration) -> Self {
        Self {
            duration,
            frame_interval,
        }
    }

    /// Eased progress after `elapsed`.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        ease_cubic_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }

    /// Number of frames, always at least one.
    pub fn frame_count(&self) -> usize {
        if self.frame_interval.is_zero() {
            return 1;
        }
        let n = self.duration.as_nanos().div_ceil(self.frame_interval.as_nanos());
        (n as usize).max(1)
    }

    /// Eased progress at each frame. The last value is exactly 1.
    pub fn steps(&self) -> Vec<f64> {
        let n = self.frame_count();
        (1..=n)
            .map(|i| {
                if i == n {
                    1.0
                } else {
                    self.progress(self.frame_interval * i as u32)
                }
            })
            .collect()
    }

    /// Sample `interpolate` at every frame.
    pub fn sample<T>(&self, mut interpolate: impl FnMut(f64) -> T) -> Vec<T> {
        self.steps().into_iter().map(&mut interpolate).collect()
    }
}

/// Linear interpolation between two values. Lands exactly on `b` at `u = 1`.
pub fn lerp(a: f64, b: f64, u: f64) -> f64 {
    if u >= 1.0 {
        return b;
    }
    a + (b - a) * u
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
        assert!(ease_cubic_in_out(0.75) > 0.75);
    }

    #[test]
    fn test_frames_for_reset() {
        let t = Transition::new(Duration::from_millis(750), Duration::from_millis(16));
        let steps = t.steps();
        assert_eq!(steps.len(), 47);
        assert_eq!(*steps.last().unwrap(), 1.0);
        assert!(steps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_zero_duration_jumps_to_end() {
        let t = Transition::new(Duration::ZERO, Duration::from_millis(16));
        assert_eq!(t.steps(), vec![1.0]);
    }

    #[test]
    fn test_sample_interpolates() {
        let t = Transition::new(Duration::from_millis(500), Duration::from_millis(250));
        let values = t.sample(|u| lerp(60.0, 80.0, u));
        assert_eq!(values, vec![70.0, 80.0]);
    }
}
