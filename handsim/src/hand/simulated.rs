//! Simulated hand devices.
//!
//! A `SimulatedHand` is fed one `HandSnapshot` per frame. Both variants
//! share joint storage, velocity tracking and source detection; they differ
//! in the interactions they expose:
//!
//! - `Gesture`: reports the grip pose and fingertip position, and turns the
//!   pinch signal into select / hold / manipulation / navigation gestures.
//! - `Articulated`: reports pointer, grip and index-finger poses and maps
//!   the pinch signal straight onto select and grab input.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::joints::{HandJoint, HandSnapshot, JointPose};
use super::pose_store::JointPoseStore;
use super::velocity::VelocityTracker;
use crate::gesture::config::{GestureConfig, InputAction, LazyGestureConfig, ProfileSource};
use crate::gesture::events::{EventLog, EventSink, InputSource, NullSink};
use crate::gesture::recognizer::GestureStateMachine;
use crate::math::Vec3;
use crate::sexp::bool_sexp;

// ── Interactions ───────────────────────────────────────────

/// Shape of an interaction's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Digital,
    SixDof,
}

/// The physical input an interaction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceInput {
    SpatialPointer,
    SpatialGrip,
    Select,
    Grab,
    IndexFinger,
}

/// One interaction a hand variant exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionMapping {
    pub id: u32,
    pub description: &'static str,
    pub axis: AxisKind,
    pub input: DeviceInput,
}

const GESTURE_INTERACTIONS: [InteractionMapping; 2] = [
    InteractionMapping {
        id: 0,
        description: "Select",
        axis: AxisKind::Digital,
        input: DeviceInput::Select,
    },
    InteractionMapping {
        id: 1,
        description: "Grip Pose",
        axis: AxisKind::SixDof,
        input: DeviceInput::SpatialGrip,
    },
];

const ARTICULATED_INTERACTIONS: [InteractionMapping; 5] = [
    InteractionMapping {
        id: 0,
        description: "Spatial Pointer",
        axis: AxisKind::SixDof,
        input: DeviceInput::SpatialPointer,
    },
    InteractionMapping {
        id: 1,
        description: "Spatial Grip",
        axis: AxisKind::SixDof,
        input: DeviceInput::SpatialGrip,
    },
    InteractionMapping {
        id: 2,
        description: "Select",
        axis: AxisKind::Digital,
        input: DeviceInput::Select,
    },
    InteractionMapping {
        id: 3,
        description: "Grab",
        axis: AxisKind::Digital,
        input: DeviceInput::Grab,
    },
    InteractionMapping {
        id: 4,
        description: "Index Finger Pose",
        axis: AxisKind::SixDof,
        input: DeviceInput::IndexFinger,
    },
];

/// Which kind of simulated hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandVariant {
    Gesture,
    Articulated,
}

impl HandVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
            Self::Articulated => "articulated",
        }
    }

    pub fn parse(s: &str) -> Option<HandVariant> {
        match s {
            "gesture" => Some(Self::Gesture),
            "articulated" => Some(Self::Articulated),
            _ => None,
        }
    }

    /// Interactions this variant reports.
    pub fn default_interactions(&self) -> &'static [InteractionMapping] {
        match self {
            Self::Gesture => &GESTURE_INTERACTIONS,
            Self::Articulated => &ARTICULATED_INTERACTIONS,
        }
    }
}

// ── Hand ───────────────────────────────────────────────────

/// Last reported value of each interaction, for change detection.
#[derive(Debug, Clone, Default)]
struct InteractionCache {
    fingertip: Option<Vec3>,
    pointer: Option<JointPose>,
    grip: Option<JointPose>,
    index_finger: Option<JointPose>,
    pinching: bool,
}

/// A simulated hand input device.
pub struct SimulatedHand<P, S = EventLog> {
    variant: HandVariant,
    source: InputSource,
    store: JointPoseStore,
    velocity: VelocityTracker,
    config: LazyGestureConfig<P>,
    gestures: GestureStateMachine,
    actions: HashMap<DeviceInput, InputAction>,
    cache: InteractionCache,
    tracked: bool,
    sink: Option<S>,
}

impl<P: ProfileSource, S: EventSink> SimulatedHand<P, S> {
    /// Create an untracked hand with no sink attached.
    pub fn new(variant: HandVariant, source: InputSource, profile_source: P) -> Self {
        Self {
            variant,
            source,
            store: JointPoseStore::new(),
            velocity: VelocityTracker::new(),
            config: LazyGestureConfig::new(profile_source),
            gestures: GestureStateMachine::new(),
            actions: HashMap::new(),
            cache: InteractionCache::default(),
            tracked: false,
            sink: None,
        }
    }

    /// Attach an event sink.
    pub fn with_sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Bind an input action to one of this hand's interactions.
    ///
    /// Unbound select falls back to the gesture profile's select action;
    /// anything else unbound reports `InputAction::none()`.
    pub fn bind_action(&mut self, input: DeviceInput, action: InputAction) {
        self.actions.insert(input, action);
    }

    /// Consume one frame of hand data.
    pub fn update(&mut self, snapshot: HandSnapshot, now: Duration) {
        let Self {
            variant,
            source,
            store,
            velocity,
            config,
            gestures,
            actions,
            cache,
            tracked,
            sink,
        } = self;

        store.update(&snapshot);
        let config = config.resolve();

        let mut null = NullSink;
        let sink: &mut dyn EventSink = match sink.as_mut() {
            Some(s) => s,
            None => &mut null,
        };

        if snapshot.tracked != *tracked {
            *tracked = snapshot.tracked;
            if snapshot.tracked {
                info!("{} detected ({})", source.name, variant.as_str());
                gestures.reanchor();
                velocity.reset();
                *cache = InteractionCache::default();
                sink.raise_source_detected(source);
            } else {
                info!("{} lost", source.name);
                match variant {
                    HandVariant::Gesture => gestures.cancel_all(config, source, sink),
                    HandVariant::Articulated => {
                        if cache.pinching {
                            cache.pinching = false;
                            let select = action_for(actions, config, DeviceInput::Select);
                            let grab = action_for(actions, config, DeviceInput::Grab);
                            sink.raise_input_up(source, &select);
                            sink.raise_input_up(source, &grab);
                        }
                    }
                }
                sink.raise_source_lost(source);
            }
        }

        if !snapshot.tracked {
            return;
        }

        let palm = *snapshot.joint(HandJoint::Palm);
        velocity.update(palm.position, now);

        match variant {
            HandVariant::Gesture => {
                let tip = snapshot.joint(HandJoint::IndexTip).position;
                gestures.track_fingertip(tip);
                if cache.fingertip != Some(tip) {
                    cache.fingertip = Some(tip);
                    sink.raise_source_position_changed(source, tip);
                }
                if cache.grip != Some(palm) {
                    cache.grip = Some(palm);
                    let grip = action_for(actions, config, DeviceInput::SpatialGrip);
                    sink.raise_pose_changed(source, &grip, palm);
                }
                gestures.process(snapshot.pinching, now, config, source, sink);
            }
            HandVariant::Articulated => {
                for mapping in variant.default_interactions() {
                    let action = action_for(actions, config, mapping.input);
                    match mapping.input {
                        DeviceInput::SpatialPointer => {
                            let pointer = pointer_pose(&snapshot);
                            if cache.pointer != Some(pointer) {
                                cache.pointer = Some(pointer);
                                sink.raise_pose_changed(source, &action, pointer);
                            }
                        }
                        DeviceInput::SpatialGrip => {
                            if cache.grip != Some(palm) {
                                cache.grip = Some(palm);
                                sink.raise_pose_changed(source, &action, palm);
                            }
                        }
                        DeviceInput::IndexFinger => {
                            let index = *snapshot.joint(HandJoint::IndexTip);
                            if cache.index_finger != Some(index) {
                                cache.index_finger = Some(index);
                                sink.raise_pose_changed(source, &action, index);
                            }
                        }
                        DeviceInput::Select | DeviceInput::Grab => {
                            if snapshot.pinching != cache.pinching {
                                if snapshot.pinching {
                                    sink.raise_input_down(source, &action);
                                } else {
                                    sink.raise_input_up(source, &action);
                                }
                            }
                        }
                    }
                }
                cache.pinching = snapshot.pinching;
            }
        }
        trace!("{} frame at {:?}", source.name, now);
    }

    /// Latest pose of a joint while the hand is tracked.
    pub fn try_get_joint(&self, joint: HandJoint) -> Option<JointPose> {
        if !self.tracked {
            return None;
        }
        self.store.get(joint)
    }

    pub fn default_interactions(&self) -> &'static [InteractionMapping] {
        self.variant.default_interactions()
    }

    pub fn variant(&self) -> HandVariant {
        self.variant
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Palm linear velocity in meters per second.
    pub fn velocity(&self) -> Vec3 {
        self.velocity.velocity()
    }

    pub fn gestures(&self) -> &GestureStateMachine {
        &self.gestures
    }

    pub fn config(&self) -> &LazyGestureConfig<P> {
        &self.config
    }

    /// Re-read the gesture profile on the next frame.
    pub fn refresh_config(&mut self) {
        debug!("{} will re-read its gesture profile", self.source.name);
        self.config.force_refresh();
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        let v = self.velocity.velocity();
        format!(
            "(:hand :{} :variant :{} :tracked {} :velocity ({:.3} {:.3} {:.3}) :gestures {})",
            self.source.handedness.as_str(),
            self.variant.as_str(),
            bool_sexp(self.tracked),
            v.x,
            v.y,
            v.z,
            self.gestures.status_sexp(),
        )
    }
}

fn action_for(
    actions: &HashMap<DeviceInput, InputAction>,
    config: &GestureConfig,
    input: DeviceInput,
) -> InputAction {
    match actions.get(&input) {
        Some(action) => action.clone(),
        None if input == DeviceInput::Select => config.select_action.clone(),
        None => InputAction::none(),
    }
}

/// Pointer ray origin at the index knuckle, aimed along the index tip.
fn pointer_pose(snapshot: &HandSnapshot) -> JointPose {
    JointPose::new(
        snapshot.joint(HandJoint::IndexKnuckle).position,
        snapshot.joint(HandJoint::IndexTip).rotation,
    )
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::config::{GestureBinding, GestureKind, GesturesProfile};
    use crate::gesture::events::GestureEvent;
    use crate::hand::joints::Handedness;
    use crate::math::Quat;

    fn profile() -> GesturesProfile {
        GesturesProfile {
            hold_start_duration: 0.5,
            navigation_start_threshold: 0.05,
            use_rails_navigation: true,
            gestures: vec![GestureBinding {
                kind: GestureKind::Select,
                action: InputAction::new(1, "Select"),
            }],
        }
    }

    fn hand(variant: HandVariant) -> SimulatedHand<GesturesProfile, EventLog> {
        SimulatedHand::new(
            variant,
            InputSource::new(2, "Left Hand", Handedness::Left),
            profile(),
        )
        .with_sink(EventLog::new())
    }

    fn frame(tracked: bool, pinching: bool, tip: Vec3) -> HandSnapshot {
        let mut snap = HandSnapshot::uniform(tracked, pinching, Vec3::new(0.0, -0.05, 0.5));
        snap.set_joint(HandJoint::IndexTip, JointPose::at(tip));
        snap
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn names(hand: &SimulatedHand<GesturesProfile, EventLog>) -> Vec<&'static str> {
        hand.sink()
            .map(|log| log.events().iter().map(GestureEvent::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_default_interactions() {
        assert_eq!(HandVariant::Gesture.default_interactions().len(), 2);
        let articulated = HandVariant::Articulated.default_interactions();
        assert_eq!(articulated.len(), 5);
        assert_eq!(articulated[3].input, DeviceInput::Grab);
        assert_eq!(articulated[3].axis, AxisKind::Digital);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(HandVariant::parse("gesture"), Some(HandVariant::Gesture));
        assert_eq!(HandVariant::parse("articulated"), Some(HandVariant::Articulated));
        assert_eq!(HandVariant::parse("mouse"), None);
    }

    #[test]
    fn test_source_detected_then_positions() {
        let mut h = hand(HandVariant::Gesture);
        h.update(frame(true, false, Vec3::new(0.0, 0.0, 0.5)), ms(0));
        assert_eq!(
            names(&h),
            vec!["source-detected", "source-position", "pose-changed"]
        );
        assert!(h.is_tracked());

        // unchanged frame reports nothing new
        h.sink_mut().unwrap().clear();
        h.update(frame(true, false, Vec3::new(0.0, 0.0, 0.5)), ms(16));
        assert!(names(&h).is_empty());
    }

    #[test]
    fn test_try_get_joint_only_while_tracked() {
        let mut h = hand(HandVariant::Gesture);
        assert!(h.try_get_joint(HandJoint::IndexTip).is_none());
        let tip = Vec3::new(0.1, 0.2, 0.3);
        h.update(frame(true, false, tip), ms(0));
        assert_eq!(
            h.try_get_joint(HandJoint::IndexTip).map(|p| p.position),
            Some(tip)
        );
        h.update(frame(false, false, tip), ms(16));
        assert!(h.try_get_joint(HandJoint::IndexTip).is_none());
    }

    #[test]
    fn test_gesture_hand_select_uses_profile_action() {
        let mut h = hand(HandVariant::Gesture);
        let tip = Vec3::new(0.0, 0.0, 0.5);
        h.update(frame(true, true, tip), ms(0));
        let down = h
            .sink()
            .unwrap()
            .events()
            .iter()
            .find(|e| matches!(e, GestureEvent::InputDown { .. }))
            .cloned();
        assert!(matches!(
            down,
            Some(GestureEvent::InputDown { ref action, .. }) if action.id == 1
        ));
    }

    #[test]
    fn test_tracking_lost_cancels_gestures() {
        let mut h = hand(HandVariant::Gesture);
        h.update(frame(true, true, Vec3::new(0.0, 0.0, 0.5)), ms(0));
        h.update(frame(true, true, Vec3::new(0.2, 0.0, 0.5)), ms(16));
        assert!(h.gestures().is_in_progress(GestureKind::Navigation));
        h.sink_mut().unwrap().clear();

        h.update(frame(false, true, Vec3::new(0.2, 0.0, 0.5)), ms(32));
        assert_eq!(
            names(&h),
            vec!["input-up", "gesture-canceled", "gesture-canceled", "source-lost"]
        );
        assert!(!h.gestures().is_in_progress(GestureKind::Manipulation));

        // untracked frames do nothing
        h.sink_mut().unwrap().clear();
        h.update(frame(false, false, Vec3::new(0.9, 0.0, 0.5)), ms(48));
        assert!(names(&h).is_empty());
    }

    #[test]
    fn test_regained_tracking_does_not_jump() {
        let mut h = hand(HandVariant::Gesture);
        h.update(frame(true, false, Vec3::new(0.0, 0.0, 0.5)), ms(0));
        h.update(frame(false, false, Vec3::new(0.0, 0.0, 0.5)), ms(16));
        h.update(frame(true, true, Vec3::new(1.0, 0.0, 0.5)), ms(32));
        h.update(frame(true, true, Vec3::new(1.0, 0.0, 0.5)), ms(48));
        assert_eq!(h.gestures().cumulative_delta(), Vec3::ZERO);
        assert!(!h.gestures().is_in_progress(GestureKind::Navigation));
    }

    #[test]
    fn test_articulated_pinch_maps_select_and_grab() {
        let mut h = hand(HandVariant::Articulated);
        h.bind_action(DeviceInput::Grab, InputAction::new(9, "Grab"));
        let tip = Vec3::new(0.0, 0.0, 0.5);
        h.update(frame(true, false, tip), ms(0));
        h.sink_mut().unwrap().clear();

        h.update(frame(true, true, tip), ms(16));
        let events = h.sink_mut().unwrap().drain();
        let downs: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GestureEvent::InputDown { action, .. } => Some(action.id),
                _ => None,
            })
            .collect();
        assert_eq!(downs, vec![1, 9]);
        // articulated hands never report gestures
        assert!(events.iter().all(|e| e.gesture().is_none()));

        h.update(frame(true, false, tip), ms(32));
        assert_eq!(names(&h), vec!["input-up", "input-up"]);
    }

    #[test]
    fn test_articulated_reports_poses() {
        let mut h = hand(HandVariant::Articulated);
        let mut snap = frame(true, false, Vec3::new(0.0, 0.0, 0.5));
        snap.set_joint(
            HandJoint::IndexKnuckle,
            JointPose::new(Vec3::new(0.0, 0.0, 0.45), Quat::IDENTITY),
        );
        h.update(snap, ms(0));
        assert_eq!(
            names(&h),
            vec!["source-detected", "pose-changed", "pose-changed", "pose-changed"]
        );
    }

    #[test]
    fn test_no_sink_is_silent() {
        let mut h: SimulatedHand<GesturesProfile, EventLog> = SimulatedHand::new(
            HandVariant::Gesture,
            InputSource::new(3, "Right Hand", Handedness::Right),
            profile(),
        );
        h.update(frame(true, true, Vec3::ZERO), ms(0));
        h.update(frame(true, true, Vec3::new(0.3, 0.0, 0.0)), ms(16));
        assert!(h.sink().is_none());
        // state still advances without a sink
        assert!(h.gestures().is_in_progress(GestureKind::Manipulation));
    }

    #[test]
    fn test_missing_profile_uses_defaults() {
        let mut h: SimulatedHand<Option<GesturesProfile>, EventLog> = SimulatedHand::new(
            HandVariant::Gesture,
            InputSource::new(4, "Right Hand", Handedness::Right),
            None,
        );
        h.update(frame(true, false, Vec3::ZERO), ms(0));
        assert!(h.config().used_defaults());
    }

    #[test]
    fn test_velocity_from_palm() {
        let mut h = hand(HandVariant::Gesture);
        for i in 0..10u64 {
            let mut snap = frame(true, false, Vec3::ZERO);
            snap.set_joint(
                HandJoint::Palm,
                JointPose::at(Vec3::new(i as f32 * 0.01, 0.0, 0.0)),
            );
            h.update(snap, ms(i * 10));
        }
        // 0.01 m per 10 ms
        assert!((h.velocity().x - 1.0).abs() < 1e-3, "got {:?}", h.velocity());
    }

    #[test]
    fn test_status_sexp() {
        let h = hand(HandVariant::Articulated);
        let sexp = h.status_sexp();
        assert!(sexp.contains(":variant :articulated"));
        assert!(sexp.contains(":tracked nil"));
        assert!(lexpr::from_str(&sexp).is_ok());
    }
}
