//! handsim - simulated-hand gesture recognition.
//!
//! Turns per-frame hand joint snapshots and a pinch signal into select,
//! hold, manipulation and navigation gestures with start / update /
//! complete / cancel notifications.

pub mod gesture;
pub mod hand;
pub mod math;
pub mod replay;
pub mod sexp;

pub use gesture::{
    EventLog, EventSink, GestureConfig, GestureEvent, GestureKind, GestureStateMachine,
    GesturesProfile, InputAction, InputSource, LazyGestureConfig, ProfileSource, RailsState,
    SexpProfileFile,
};
pub use hand::{
    HandJoint, HandSnapshot, HandVariant, Handedness, JointPose, JointPoseStore, SimulatedHand,
    VelocityTracker, JOINT_COUNT,
};
pub use math::{Quat, Vec3};
