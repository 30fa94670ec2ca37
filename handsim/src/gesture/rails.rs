//! Axis locking ("rails") for navigation gestures.

use crate::math::Vec3;

/// Which axes a navigation gesture reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RailsState {
    #[default]
    Unconstrained,
    XLocked,
    YLocked,
    ZLocked,
}

impl RailsState {
    /// Per-axis multiplier applied to the navigation delta.
    pub fn mask(&self) -> Vec3 {
        match self {
            Self::Unconstrained => Vec3::ONE,
            Self::XLocked => Vec3::new(1.0, 0.0, 0.0),
            Self::YLocked => Vec3::new(0.0, 1.0, 0.0),
            Self::ZLocked => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    pub fn is_locked(&self) -> bool {
        *self != Self::Unconstrained
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconstrained => "none",
            Self::XLocked => "x",
            Self::YLocked => "y",
            Self::ZLocked => "z",
        }
    }
}

/// Lock navigation to the first axis whose travel exceeds `threshold`.
///
/// Returns `current` unchanged when rails are disabled or an axis is
/// already locked. Axes are tested X, Y, Z; X uses `>=` while Y and Z use
/// `>`, so an exact-threshold move only ever locks X.
pub fn lock_if_needed(
    delta: Vec3,
    threshold: f32,
    rails_enabled: bool,
    current: RailsState,
) -> RailsState {
    if !rails_enabled || current.is_locked() {
        return current;
    }
    if delta.x.abs() >= threshold {
        RailsState::XLocked
    } else if delta.y.abs() > threshold {
        RailsState::YLocked
    } else if delta.z.abs() > threshold {
        RailsState::ZLocked
    } else {
        current
    }
}

/// Navigation delta: each axis clamped to [-1, 1], then masked by the rails.
pub fn navigation_delta(cumulative: Vec3, rails: RailsState) -> Vec3 {
    cumulative.clamp_each(-1.0, 1.0).scale_by(rails.mask())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f32 = 0.05;

    #[test]
    fn test_disabled_stays_unconstrained() {
        let big = Vec3::new(5.0, 5.0, 5.0);
        assert_eq!(
            lock_if_needed(big, T, false, RailsState::Unconstrained),
            RailsState::Unconstrained
        );
    }

    #[test]
    fn test_locks_first_axis_over_threshold() {
        assert_eq!(
            lock_if_needed(Vec3::new(0.0, -0.1, 0.0), T, true, RailsState::Unconstrained),
            RailsState::YLocked
        );
        assert_eq!(
            lock_if_needed(Vec3::new(0.0, 0.0, 0.2), T, true, RailsState::Unconstrained),
            RailsState::ZLocked
        );
    }

    #[test]
    fn test_below_threshold_stays_unconstrained() {
        assert_eq!(
            lock_if_needed(Vec3::new(0.01, 0.02, 0.03), T, true, RailsState::Unconstrained),
            RailsState::Unconstrained
        );
    }

    #[test]
    fn test_ties_prefer_x_then_y() {
        let all = Vec3::new(0.1, 0.1, 0.1);
        assert_eq!(
            lock_if_needed(all, T, true, RailsState::Unconstrained),
            RailsState::XLocked
        );
        let yz = Vec3::new(0.0, 0.1, 0.1);
        assert_eq!(
            lock_if_needed(yz, T, true, RailsState::Unconstrained),
            RailsState::YLocked
        );
    }

    #[test]
    fn test_exact_threshold_only_locks_x() {
        // X compares with >=, Y and Z with >.
        assert_eq!(
            lock_if_needed(Vec3::new(T, 0.0, 0.0), T, true, RailsState::Unconstrained),
            RailsState::XLocked
        );
        assert_eq!(
            lock_if_needed(Vec3::new(0.0, T, 0.0), T, true, RailsState::Unconstrained),
            RailsState::Unconstrained
        );
        assert_eq!(
            lock_if_needed(Vec3::new(0.0, 0.0, T), T, true, RailsState::Unconstrained),
            RailsState::Unconstrained
        );
    }

    #[test]
    fn test_zero_threshold_locks_x_immediately() {
        assert_eq!(
            lock_if_needed(Vec3::ZERO, 0.0, true, RailsState::Unconstrained),
            RailsState::XLocked
        );
    }

    #[test]
    fn test_locked_state_is_frozen() {
        let later = Vec3::new(0.0, 0.9, 0.0);
        assert_eq!(
            lock_if_needed(later, T, true, RailsState::XLocked),
            RailsState::XLocked
        );
    }

    #[test]
    fn test_navigation_delta_clamps_then_masks() {
        let d = navigation_delta(Vec3::new(3.0, -0.5, 0.2), RailsState::XLocked);
        assert_eq!(d, Vec3::new(1.0, 0.0, 0.0));
        let d = navigation_delta(Vec3::new(-3.0, -0.5, 2.0), RailsState::Unconstrained);
        assert_eq!(d, Vec3::new(-1.0, -0.5, 1.0));
    }
}
