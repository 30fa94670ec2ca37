//! Hand data: joints, per-frame snapshots, pose storage, velocity, and the
//! simulated hand devices built on top of them.

pub mod joints;
pub mod pose_store;
pub mod simulated;
pub mod velocity;

pub use joints::{HandJoint, HandSnapshot, Handedness, JointPose, SnapshotError, JOINT_COUNT};
pub use pose_store::JointPoseStore;
pub use simulated::{AxisKind, DeviceInput, HandVariant, InteractionMapping, SimulatedHand};
pub use velocity::VelocityTracker;
