//! Latest joint pose per hand joint.

use super::joints::{HandJoint, HandSnapshot, JointPose, JOINT_COUNT};

/// Holds the most recent pose of every joint, replaced wholesale each frame.
#[derive(Debug, Clone, Default)]
pub struct JointPoseStore {
    poses: [Option<JointPose>; JOINT_COUNT],
}

impl JointPoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every stored pose with the snapshot's.
    pub fn update(&mut self, snapshot: &HandSnapshot) {
        for (slot, pose) in self.poses.iter_mut().zip(snapshot.joints.iter()) {
            *slot = Some(*pose);
        }
    }

    /// Stored pose for `joint`, or `None` if no snapshot has been seen.
    pub fn get(&self, joint: HandJoint) -> Option<JointPose> {
        self.poses[joint.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec3};

    fn numbered_snapshot(offset: f32) -> HandSnapshot {
        let joints: Vec<JointPose> = (0..JOINT_COUNT)
            .map(|i| {
                JointPose::new(
                    Vec3::new(i as f32 * 0.01 + offset, 0.0, 0.0),
                    Quat::new(0.0, 0.0, i as f32 * 0.01, 1.0),
                )
            })
            .collect();
        HandSnapshot::from_joints(true, false, joints).unwrap()
    }

    #[test]
    fn test_unknown_before_update() {
        let store = JointPoseStore::new();
        for joint in HandJoint::ALL {
            assert!(store.get(joint).is_none(), "Expected no pose for {:?}", joint);
        }
    }

    #[test]
    fn test_round_trip_every_joint() {
        let mut store = JointPoseStore::new();
        let snap = numbered_snapshot(0.0);
        store.update(&snap);
        for joint in HandJoint::ALL {
            assert_eq!(store.get(joint), Some(snap.joints[joint.index()]));
        }
    }

    #[test]
    fn test_update_replaces_wholesale() {
        let mut store = JointPoseStore::new();
        store.update(&numbered_snapshot(0.0));
        let second = numbered_snapshot(1.0);
        store.update(&second);
        assert_eq!(
            store.get(HandJoint::Wrist).map(|p| p.position.x),
            Some(1.0)
        );
        assert_eq!(store.get(HandJoint::PinkyTip), Some(second.joints[25]));
    }
}
