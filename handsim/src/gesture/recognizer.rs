//! Gesture recognition from the select signal and fingertip motion.
//!
//! Three sessions (Hold, Manipulation, Navigation) run side by side,
//! gated by the select (pinch) signal. While select is held, fingertip
//! travel beyond the navigation threshold cancels Hold and starts both
//! Navigation and Manipulation; staying still long enough starts Hold.
//! Releasing select completes whatever is in progress, or reports a
//! plain select tap if nothing is.

use std::time::Duration;

use tracing::{debug, trace};

use super::config::{GestureConfig, GestureKind};
use super::events::{EventSink, InputSource};
use super::rails::{lock_if_needed, navigation_delta, RailsState};
use crate::math::Vec3;
use crate::sexp::bool_sexp;

// ── Sessions ───────────────────────────────────────────────

/// Lifecycle flag for one gesture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSession {
    pub kind: GestureKind,
    pub in_progress: bool,
}

impl GestureSession {
    fn new(kind: GestureKind) -> Self {
        Self {
            kind,
            in_progress: false,
        }
    }
}

/// Everything a transition needs to notify the sink.
struct Emit<'a, 's> {
    config: &'a GestureConfig,
    source: &'a InputSource,
    sink: &'a mut (dyn EventSink + 's),
}

impl Emit<'_, '_> {
    fn started(&mut self, kind: GestureKind) {
        self.sink
            .raise_gesture_started(self.source, kind, self.config.action(kind));
    }

    fn updated(&mut self, kind: GestureKind, delta: Vec3) {
        self.sink
            .raise_gesture_updated(self.source, kind, self.config.action(kind), delta);
    }

    fn completed(&mut self, kind: GestureKind, delta: Option<Vec3>) {
        self.sink
            .raise_gesture_completed(self.source, kind, self.config.action(kind), delta);
    }

    fn canceled(&mut self, kind: GestureKind) {
        self.sink
            .raise_gesture_canceled(self.source, kind, self.config.action(kind));
    }
}

// ── State machine ──────────────────────────────────────────

/// Per-hand gesture recognizer.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    select_pressed: bool,
    select_down_time: Duration,
    last_fingertip: Option<Vec3>,
    cumulative_delta: Vec3,
    hold: GestureSession,
    manipulation: GestureSession,
    navigation: GestureSession,
    rails: RailsState,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureStateMachine {
    pub fn new() -> Self {
        Self {
            select_pressed: false,
            select_down_time: Duration::ZERO,
            last_fingertip: None,
            cumulative_delta: Vec3::ZERO,
            hold: GestureSession::new(GestureKind::Hold),
            manipulation: GestureSession::new(GestureKind::Manipulation),
            navigation: GestureSession::new(GestureKind::Navigation),
            rails: RailsState::Unconstrained,
        }
    }

    /// Record this frame's fingertip position and accumulate the motion.
    ///
    /// The first position after construction or `reanchor` only sets the
    /// reference point. Returns the frame delta.
    pub fn track_fingertip(&mut self, position: Vec3) -> Vec3 {
        let delta = self
            .last_fingertip
            .map(|last| position - last)
            .unwrap_or(Vec3::ZERO);
        self.cumulative_delta += delta;
        self.last_fingertip = Some(position);
        delta
    }

    /// Forget the fingertip reference so the next position causes no jump.
    pub fn reanchor(&mut self) {
        self.last_fingertip = None;
    }

    /// Advance the gesture sessions for one frame.
    pub fn process(
        &mut self,
        select: bool,
        now: Duration,
        config: &GestureConfig,
        source: &InputSource,
        sink: &mut dyn EventSink,
    ) {
        let mut out = Emit {
            config,
            source,
            sink,
        };
        let changed = select != self.select_pressed;
        self.select_pressed = select;

        if changed {
            if select {
                out.sink.raise_input_down(source, &config.select_action);
                self.select_down_time = now;
                self.cumulative_delta = Vec3::ZERO;
                trace!("select down at {:?}", now);
            } else {
                out.sink.raise_input_up(source, &config.select_action);
                self.try_complete_select(&mut out);
                self.try_complete_hold(&mut out);
                self.try_complete_manipulation(&mut out);
                self.try_complete_navigation(&mut out);
            }
            return;
        }

        if !select {
            return;
        }

        if self.manipulation.in_progress {
            out.updated(GestureKind::Manipulation, self.cumulative_delta);
        }
        if self.navigation.in_progress {
            self.update_rails(config);
            out.updated(GestureKind::Navigation, self.navigation_delta());
        }

        if self.cumulative_delta.magnitude() > config.navigation_start_threshold {
            self.try_cancel_hold(&mut out);
            self.try_start_navigation(&mut out);
            self.try_start_manipulation(&mut out);
        } else if now >= self.select_down_time + config.hold_start_duration {
            self.try_start_hold(&mut out);
        }
    }

    /// Cancel every in-progress session and release select.
    ///
    /// Used when the hand stops being tracked mid-gesture.
    pub fn cancel_all(
        &mut self,
        config: &GestureConfig,
        source: &InputSource,
        sink: &mut dyn EventSink,
    ) {
        let mut out = Emit {
            config,
            source,
            sink,
        };
        if self.select_pressed {
            self.select_pressed = false;
            out.sink.raise_input_up(source, &config.select_action);
        }
        self.try_cancel_hold(&mut out);
        for session in [&mut self.manipulation, &mut self.navigation] {
            if session.in_progress {
                session.in_progress = false;
                debug!("{} canceled on {}", session.kind.as_str(), source.name);
                out.canceled(session.kind);
            }
        }
    }

    fn update_rails(&mut self, config: &GestureConfig) {
        self.rails = lock_if_needed(
            self.cumulative_delta,
            config.navigation_start_threshold,
            config.use_rails_navigation,
            self.rails,
        );
    }

    // ── Transitions ────────────────────────────────────────

    fn try_complete_select(&mut self, out: &mut Emit<'_, '_>) {
        if !self.hold.in_progress && !self.manipulation.in_progress && !self.navigation.in_progress
        {
            out.started(GestureKind::Select);
            out.completed(GestureKind::Select, None);
        }
    }

    fn try_start_hold(&mut self, out: &mut Emit<'_, '_>) {
        if !self.hold.in_progress {
            self.hold.in_progress = true;
            debug!("hold started on {}", out.source.name);
            out.started(GestureKind::Hold);
        }
    }

    fn try_complete_hold(&mut self, out: &mut Emit<'_, '_>) {
        if self.hold.in_progress {
            self.hold.in_progress = false;
            out.completed(GestureKind::Hold, None);
        }
    }

    fn try_cancel_hold(&mut self, out: &mut Emit<'_, '_>) {
        if self.hold.in_progress {
            self.hold.in_progress = false;
            debug!("hold canceled on {}", out.source.name);
            out.canceled(GestureKind::Hold);
        }
    }

    fn try_start_manipulation(&mut self, out: &mut Emit<'_, '_>) {
        if !self.manipulation.in_progress {
            self.manipulation.in_progress = true;
            debug!("manipulation started on {}", out.source.name);
            out.started(GestureKind::Manipulation);
        }
    }

    fn try_complete_manipulation(&mut self, out: &mut Emit<'_, '_>) {
        if self.manipulation.in_progress {
            self.manipulation.in_progress = false;
            out.completed(GestureKind::Manipulation, Some(self.cumulative_delta));
        }
    }

    fn try_start_navigation(&mut self, out: &mut Emit<'_, '_>) {
        if !self.navigation.in_progress {
            self.rails = RailsState::Unconstrained;
            self.update_rails(out.config);
            self.navigation.in_progress = true;
            debug!(
                "navigation started on {} (rails {})",
                out.source.name,
                self.rails.as_str()
            );
            out.started(GestureKind::Navigation);
        }
    }

    fn try_complete_navigation(&mut self, out: &mut Emit<'_, '_>) {
        if self.navigation.in_progress {
            self.navigation.in_progress = false;
            out.completed(GestureKind::Navigation, Some(self.navigation_delta()));
        }
    }

    // ── Queries ────────────────────────────────────────────

    /// Whether a session is in progress. Select is never a session.
    pub fn is_in_progress(&self, kind: GestureKind) -> bool {
        match kind {
            GestureKind::Select => false,
            GestureKind::Hold => self.hold.in_progress,
            GestureKind::Manipulation => self.manipulation.in_progress,
            GestureKind::Navigation => self.navigation.in_progress,
        }
    }

    pub fn is_select_pressed(&self) -> bool {
        self.select_pressed
    }

    /// Fingertip travel since the last select-down.
    pub fn cumulative_delta(&self) -> Vec3 {
        self.cumulative_delta
    }

    /// Clamped, rails-masked delta as reported for navigation.
    pub fn navigation_delta(&self) -> Vec3 {
        navigation_delta(self.cumulative_delta, self.rails)
    }

    pub fn rails(&self) -> RailsState {
        self.rails
    }

    /// Drop all state without notifying anyone.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Generate s-expression for status output.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:select {} :hold {} :manipulation {} :navigation {} :rails :{} :delta ({:.4} {:.4} {:.4}))",
            bool_sexp(self.select_pressed),
            bool_sexp(self.hold.in_progress),
            bool_sexp(self.manipulation.in_progress),
            bool_sexp(self.navigation.in_progress),
            self.rails.as_str(),
            self.cumulative_delta.x,
            self.cumulative_delta.y,
            self.cumulative_delta.z,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
