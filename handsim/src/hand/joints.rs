//! Hand joint definitions and per-frame hand snapshots.
//!
//! Models 26 joints per hand. The joint count is derived from the
//! explicit `HandJoint::ALL` table, never counted at runtime.

use thiserror::Error;

use crate::math::{Quat, Vec3};

// ── Joint definitions ──────────────────────────────────────

/// The tracked joints of a simulated hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    Palm,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexKnuckle,
    IndexMiddle,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleKnuckle,
    MiddleMiddle,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingKnuckle,
    RingMiddle,
    RingDistal,
    RingTip,
    PinkyMetacarpal,
    PinkyKnuckle,
    PinkyMiddle,
    PinkyDistal,
    PinkyTip,
}

impl HandJoint {
    /// Every joint, in index order.
    pub const ALL: [HandJoint; 26] = [
        Self::Wrist,
        Self::Palm,
        Self::ThumbMetacarpal,
        Self::ThumbProximal,
        Self::ThumbDistal,
        Self::ThumbTip,
        Self::IndexMetacarpal,
        Self::IndexKnuckle,
        Self::IndexMiddle,
        Self::IndexDistal,
        Self::IndexTip,
        Self::MiddleMetacarpal,
        Self::MiddleKnuckle,
        Self::MiddleMiddle,
        Self::MiddleDistal,
        Self::MiddleTip,
        Self::RingMetacarpal,
        Self::RingKnuckle,
        Self::RingMiddle,
        Self::RingDistal,
        Self::RingTip,
        Self::PinkyMetacarpal,
        Self::PinkyKnuckle,
        Self::PinkyMiddle,
        Self::PinkyDistal,
        Self::PinkyTip,
    ];

    /// Convert joint enum to array index (0-25).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for s-expression output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::Palm => "palm",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbProximal => "thumb-proximal",
            Self::ThumbDistal => "thumb-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-metacarpal",
            Self::IndexKnuckle => "index-knuckle",
            Self::IndexMiddle => "index-middle",
            Self::IndexDistal => "index-distal",
            Self::IndexTip => "index-tip",
            Self::MiddleMetacarpal => "middle-metacarpal",
            Self::MiddleKnuckle => "middle-knuckle",
            Self::MiddleMiddle => "middle-middle",
            Self::MiddleDistal => "middle-distal",
            Self::MiddleTip => "middle-tip",
            Self::RingMetacarpal => "ring-metacarpal",
            Self::RingKnuckle => "ring-knuckle",
            Self::RingMiddle => "ring-middle",
            Self::RingDistal => "ring-distal",
            Self::RingTip => "ring-tip",
            Self::PinkyMetacarpal => "pinky-metacarpal",
            Self::PinkyKnuckle => "pinky-knuckle",
            Self::PinkyMiddle => "pinky-middle",
            Self::PinkyDistal => "pinky-distal",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Parse a joint name as produced by `as_str`.
    pub fn parse(s: &str) -> Option<HandJoint> {
        Self::ALL.iter().copied().find(|j| j.as_str() == s)
    }
}

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = HandJoint::ALL.len();

// ── Handedness ─────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse hand string ("left" or "right").
    pub fn parse(s: &str) -> Option<Handedness> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

// ── Joint pose ─────────────────────────────────────────────

/// Pose data for a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointPose {
    /// Position in meters.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
}

impl JointPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity rotation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

// ── Snapshot ───────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("expected {expected} joint poses, got {actual}")]
    JointCount { expected: usize, actual: usize },
}

/// One frame of externally produced hand data.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSnapshot {
    /// Whether the hand is currently tracked.
    pub tracked: bool,
    /// Whether the hand is pinching (the select signal).
    pub pinching: bool,
    /// Joint poses indexed by `HandJoint::index`.
    pub joints: [JointPose; JOINT_COUNT],
}

impl HandSnapshot {
    pub fn new(tracked: bool, pinching: bool, joints: [JointPose; JOINT_COUNT]) -> Self {
        Self {
            tracked,
            pinching,
            joints,
        }
    }

    /// Build a snapshot from a joint list, failing fast on a wrong count.
    pub fn from_joints(
        tracked: bool,
        pinching: bool,
        joints: Vec<JointPose>,
    ) -> Result<Self, SnapshotError> {
        let actual = joints.len();
        let joints: [JointPose; JOINT_COUNT] =
            joints.try_into().map_err(|_| SnapshotError::JointCount {
                expected: JOINT_COUNT,
                actual,
            })?;
        Ok(Self::new(tracked, pinching, joints))
    }

    /// Every joint at the same position. Handy for scripted input.
    pub fn uniform(tracked: bool, pinching: bool, position: Vec3) -> Self {
        Self::new(tracked, pinching, [JointPose::at(position); JOINT_COUNT])
    }

    pub fn joint(&self, joint: HandJoint) -> &JointPose {
        &self.joints[joint.index()]
    }

    pub fn set_joint(&mut self, joint: HandJoint, pose: JointPose) {
        self.joints[joint.index()] = pose;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_count() {
        assert_eq!(HandJoint::Wrist.index(), 0);
        assert_eq!(HandJoint::PinkyTip.index(), 25);
        assert_eq!(JOINT_COUNT, 26);
    }

    #[test]
    fn test_all_in_index_order() {
        for (i, joint) in HandJoint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i, "{:?} out of order", joint);
        }
    }

    #[test]
    fn test_joint_as_str_and_parse() {
        assert_eq!(HandJoint::IndexTip.as_str(), "index-tip");
        assert_eq!(HandJoint::parse("palm"), Some(HandJoint::Palm));
        assert_eq!(HandJoint::parse("pinky-tip"), Some(HandJoint::PinkyTip));
        assert_eq!(HandJoint::parse("elbow"), None);
    }

    #[test]
    fn test_handedness_parse() {
        assert_eq!(Handedness::parse("left"), Some(Handedness::Left));
        assert_eq!(Handedness::parse("right"), Some(Handedness::Right));
        assert_eq!(Handedness::parse("both"), None);
        assert_eq!(Handedness::Right.as_str(), "right");
    }

    #[test]
    fn test_from_joints_wrong_count() {
        let err = HandSnapshot::from_joints(true, false, vec![JointPose::default(); 10])
            .unwrap_err();
        assert_eq!(
            err,
            SnapshotError::JointCount {
                expected: JOINT_COUNT,
                actual: 10
            }
        );
    }

    #[test]
    fn test_from_joints_keeps_order() {
        let joints: Vec<JointPose> = (0..JOINT_COUNT)
            .map(|i| JointPose::at(Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let snap = HandSnapshot::from_joints(true, true, joints).unwrap();
        assert_eq!(snap.joint(HandJoint::IndexTip).position.x, 10.0);
        assert!(snap.tracked);
        assert!(snap.pinching);
    }
}
