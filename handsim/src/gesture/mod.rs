//! Gesture recognition for simulated hands.
//!
//! - `config`: lazily resolved thresholds and action bindings
//! - `events`: notifications and the sinks receiving them
//! - `rails`: axis locking for navigation
//! - `recognizer`: the hold / manipulation / navigation / select state machine

pub mod config;
pub mod events;
pub mod rails;
pub mod recognizer;

pub use config::{
    GestureBinding, GestureConfig, GestureKind, GesturesProfile, InputAction, LazyGestureConfig,
    ProfileError, ProfileSource, SexpProfileFile,
};
pub use events::{EventLog, EventSink, GestureEvent, InputSource, NullSink};
pub use rails::RailsState;
pub use recognizer::GestureStateMachine;
