//! Notifications emitted by simulated hands, and the sinks that receive them.

use std::sync::mpsc::Sender;

use tracing::trace;

use super::config::{GestureKind, InputAction};
use crate::hand::joints::{Handedness, JointPose};
use crate::math::Vec3;
use crate::sexp::escape_string;

/// Identity of the device raising events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputSource {
    pub id: u32,
    pub name: String,
    pub handedness: Handedness,
}

impl InputSource {
    pub fn new(id: u32, name: impl Into<String>, handedness: Handedness) -> Self {
        Self {
            id,
            name: name.into(),
            handedness,
        }
    }
}

// ── Events ─────────────────────────────────────────────────

/// Everything a simulated hand can report.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    SourceDetected {
        source: u32,
        hand: Handedness,
    },
    SourceLost {
        source: u32,
        hand: Handedness,
    },
    SourcePositionChanged {
        source: u32,
        hand: Handedness,
        position: Vec3,
    },
    PoseChanged {
        source: u32,
        hand: Handedness,
        action: InputAction,
        pose: JointPose,
    },
    InputDown {
        source: u32,
        hand: Handedness,
        action: InputAction,
    },
    InputUp {
        source: u32,
        hand: Handedness,
        action: InputAction,
    },
    GestureStarted {
        source: u32,
        hand: Handedness,
        gesture: GestureKind,
        action: InputAction,
    },
    GestureUpdated {
        source: u32,
        hand: Handedness,
        gesture: GestureKind,
        action: InputAction,
        delta: Vec3,
    },
    GestureCompleted {
        source: u32,
        hand: Handedness,
        gesture: GestureKind,
        action: InputAction,
        delta: Option<Vec3>,
    },
    GestureCanceled {
        source: u32,
        hand: Handedness,
        gesture: GestureKind,
        action: InputAction,
    },
}

impl GestureEvent {
    /// Event name for s-expression output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceDetected { .. } => "source-detected",
            Self::SourceLost { .. } => "source-lost",
            Self::SourcePositionChanged { .. } => "source-position",
            Self::PoseChanged { .. } => "pose-changed",
            Self::InputDown { .. } => "input-down",
            Self::InputUp { .. } => "input-up",
            Self::GestureStarted { .. } => "gesture-started",
            Self::GestureUpdated { .. } => "gesture-updated",
            Self::GestureCompleted { .. } => "gesture-completed",
            Self::GestureCanceled { .. } => "gesture-canceled",
        }
    }

    /// The gesture kind, for gesture lifecycle events.
    pub fn gesture(&self) -> Option<GestureKind> {
        match self {
            Self::GestureStarted { gesture, .. }
            | Self::GestureUpdated { gesture, .. }
            | Self::GestureCompleted { gesture, .. }
            | Self::GestureCanceled { gesture, .. } => Some(*gesture),
            _ => None,
        }
    }

    pub fn hand(&self) -> Handedness {
        match self {
            Self::SourceDetected { hand, .. }
            | Self::SourceLost { hand, .. }
            | Self::SourcePositionChanged { hand, .. }
            | Self::PoseChanged { hand, .. }
            | Self::InputDown { hand, .. }
            | Self::InputUp { hand, .. }
            | Self::GestureStarted { hand, .. }
            | Self::GestureUpdated { hand, .. }
            | Self::GestureCompleted { hand, .. }
            | Self::GestureCanceled { hand, .. } => *hand,
        }
    }

    /// Format as an event plist.
    pub fn to_sexp(&self) -> String {
        let head = format!(
            "(:type :event :event :{} :hand :{}",
            self.as_str(),
            self.hand().as_str()
        );
        let tail = match self {
            Self::SourceDetected { source, .. } | Self::SourceLost { source, .. } => {
                format!(" :source {}", source)
            }
            Self::SourcePositionChanged {
                source, position, ..
            } => format!(" :source {} :position {}", source, vec3_sexp(position)),
            Self::PoseChanged {
                source,
                action,
                pose,
                ..
            } => format!(
                " :source {} :action {} :position {}",
                source,
                action_sexp(action),
                vec3_sexp(&pose.position)
            ),
            Self::InputDown { source, action, .. } | Self::InputUp { source, action, .. } => {
                format!(" :source {} :action {}", source, action_sexp(action))
            }
            Self::GestureStarted {
                source,
                gesture,
                action,
                ..
            }
            | Self::GestureCanceled {
                source,
                gesture,
                action,
                ..
            } => format!(
                " :source {} :gesture :{} :action {}",
                source,
                gesture.as_str(),
                action_sexp(action)
            ),
            Self::GestureUpdated {
                source,
                gesture,
                action,
                delta,
                ..
            } => format!(
                " :source {} :gesture :{} :action {} :delta {}",
                source,
                gesture.as_str(),
                action_sexp(action),
                vec3_sexp(delta)
            ),
            Self::GestureCompleted {
                source,
                gesture,
                action,
                delta,
                ..
            } => format!(
                " :source {} :gesture :{} :action {} :delta {}",
                source,
                gesture.as_str(),
                action_sexp(action),
                delta.as_ref().map(vec3_sexp).unwrap_or_else(|| "nil".to_string())
            ),
        };
        format!("{}{})", head, tail)
    }
}

fn vec3_sexp(v: &Vec3) -> String {
    format!("({:.4} {:.4} {:.4})", v.x, v.y, v.z)
}

fn action_sexp(action: &InputAction) -> String {
    format!(
        "(:id {} :name \"{}\")",
        action.id,
        escape_string(&action.description)
    )
}

// ── Sink ───────────────────────────────────────────────────

/// Receiver of hand notifications.
///
/// Only `emit` is required; the `raise_*` methods build the matching
/// `GestureEvent` and can be overridden by sinks that want typed callbacks.
pub trait EventSink {
    fn emit(&mut self, event: GestureEvent);

    fn raise_source_detected(&mut self, source: &InputSource) {
        self.emit(GestureEvent::SourceDetected {
            source: source.id,
            hand: source.handedness,
        });
    }

    fn raise_source_lost(&mut self, source: &InputSource) {
        self.emit(GestureEvent::SourceLost {
            source: source.id,
            hand: source.handedness,
        });
    }

    fn raise_source_position_changed(&mut self, source: &InputSource, position: Vec3) {
        self.emit(GestureEvent::SourcePositionChanged {
            source: source.id,
            hand: source.handedness,
            position,
        });
    }

    fn raise_pose_changed(&mut self, source: &InputSource, action: &InputAction, pose: JointPose) {
        self.emit(GestureEvent::PoseChanged {
            source: source.id,
            hand: source.handedness,
            action: action.clone(),
            pose,
        });
    }

    fn raise_input_down(&mut self, source: &InputSource, action: &InputAction) {
        self.emit(GestureEvent::InputDown {
            source: source.id,
            hand: source.handedness,
            action: action.clone(),
        });
    }

    fn raise_input_up(&mut self, source: &InputSource, action: &InputAction) {
        self.emit(GestureEvent::InputUp {
            source: source.id,
            hand: source.handedness,
            action: action.clone(),
        });
    }

    fn raise_gesture_started(
        &mut self,
        source: &InputSource,
        gesture: GestureKind,
        action: &InputAction,
    ) {
        self.emit(GestureEvent::GestureStarted {
            source: source.id,
            hand: source.handedness,
            gesture,
            action: action.clone(),
        });
    }

    fn raise_gesture_updated(
        &mut self,
        source: &InputSource,
        gesture: GestureKind,
        action: &InputAction,
        delta: Vec3,
    ) {
        self.emit(GestureEvent::GestureUpdated {
            source: source.id,
            hand: source.handedness,
            gesture,
            action: action.clone(),
            delta,
        });
    }

    fn raise_gesture_completed(
        &mut self,
        source: &InputSource,
        gesture: GestureKind,
        action: &InputAction,
        delta: Option<Vec3>,
    ) {
        self.emit(GestureEvent::GestureCompleted {
            source: source.id,
            hand: source.handedness,
            gesture,
            action: action.clone(),
            delta,
        });
    }

    fn raise_gesture_canceled(
        &mut self,
        source: &InputSource,
        gesture: GestureKind,
        action: &InputAction,
    ) {
        self.emit(GestureEvent::GestureCanceled {
            source: source.id,
            hand: source.handedness,
            gesture,
            action: action.clone(),
        });
    }
}

/// Records every event in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<GestureEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GestureEvent) {
        self.events.push(event);
    }
}

/// Discards everything. Stands in when no sink is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GestureEvent) {}
}

/// Forward events to another thread. A hung-up receiver drops them.
impl EventSink for Sender<GestureEvent> {
    fn emit(&mut self, event: GestureEvent) {
        if self.send(event).is_err() {
            trace!("event receiver gone; dropping event");
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: GestureEvent) {
        (**self).emit(event);
    }
}
