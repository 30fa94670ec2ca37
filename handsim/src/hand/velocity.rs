//! Palm linear velocity over a sliding window of frames.

use std::time::Duration;

use crate::math::Vec3;

/// Number of frames averaged per velocity estimate.
pub const VELOCITY_WINDOW: usize = 6;

/// Derives linear velocity from consecutive palm positions.
///
/// The first `VELOCITY_WINDOW` samples only fill the window; velocity stays
/// zero until then. Each later sample replaces the oldest one and the
/// velocity is the change of the window sum per second, averaged over
/// the window.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: [Vec3; VELOCITY_WINDOW],
    sum: Vec3,
    frames: usize,
    last_time: Option<Duration>,
    velocity: Vec3,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self {
            samples: [Vec3::ZERO; VELOCITY_WINDOW],
            sum: Vec3::ZERO,
            frames: 0,
            last_time: None,
            velocity: Vec3::ZERO,
        }
    }

    /// Feed the palm position observed at `now`.
    pub fn update(&mut self, position: Vec3, now: Duration) {
        if self.frames < VELOCITY_WINDOW {
            self.samples[self.frames] = position;
            self.sum += position;
        } else {
            let slot = self.frames % VELOCITY_WINDOW;
            let new_sum = self.sum - self.samples[slot] + position;
            let dt = self
                .last_time
                .map(|t| now.saturating_sub(t).as_secs_f32())
                .unwrap_or(0.0);
            if dt > 0.0 {
                self.velocity = (new_sum - self.sum) / dt / VELOCITY_WINDOW as f32;
            }
            self.samples[slot] = position;
            self.sum = new_sum;
        }
        self.last_time = Some(now);
        self.frames += 1;
    }

    /// Latest velocity estimate in meters per second.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_zero_until_window_full() {
        let mut tracker = VelocityTracker::new();
        for i in 0..VELOCITY_WINDOW as u64 {
            tracker.update(Vec3::new(i as f32, 0.0, 0.0), ms(i * 100));
            assert_eq!(tracker.velocity(), Vec3::ZERO);
        }
    }

    #[test]
    fn test_constant_motion() {
        let mut tracker = VelocityTracker::new();
        // 0.1 m per 100 ms along x = 1 m/s
        for i in 0..=VELOCITY_WINDOW as u64 {
            tracker.update(Vec3::new(i as f32 * 0.1, 0.0, 0.0), ms(i * 100));
        }
        // new sum replaces sample 0 (x=0) with x=0.6: sum grows by 0.6,
        // averaged over the window and 0.1 s => 1.0 m/s
        let v = tracker.velocity();
        assert!((v.x - 1.0).abs() < 1e-3, "Expected ~1.0, got {}", v.x);
        assert!(v.y.abs() < 1e-6);
    }

    #[test]
    fn test_zero_dt_keeps_previous_velocity() {
        let mut tracker = VelocityTracker::new();
        for i in 0..=VELOCITY_WINDOW as u64 {
            tracker.update(Vec3::new(i as f32 * 0.1, 0.0, 0.0), ms(i * 100));
        }
        let before = tracker.velocity();
        tracker.update(Vec3::new(5.0, 0.0, 0.0), ms(VELOCITY_WINDOW as u64 * 100));
        assert_eq!(tracker.velocity(), before);
    }

    #[test]
    fn test_stationary_is_zero() {
        let mut tracker = VelocityTracker::new();
        for i in 0..20u64 {
            tracker.update(Vec3::new(0.2, 0.3, 0.4), ms(i * 16));
        }
        assert!(tracker.velocity().magnitude() < 1e-5);
    }

    #[test]
    fn test_reset() {
        let mut tracker = VelocityTracker::new();
        for i in 0..10u64 {
            tracker.update(Vec3::new(i as f32, 0.0, 0.0), ms(i * 10));
        }
        tracker.reset();
        assert_eq!(tracker.velocity(), Vec3::ZERO);
        tracker.update(Vec3::new(100.0, 0.0, 0.0), ms(1000));
        assert_eq!(tracker.velocity(), Vec3::ZERO);
    }
}
