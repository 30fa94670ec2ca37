//! Recorded frame scripts for driving a simulated hand offline.
//!
//! A script is a sequence of frame plists, one per frame:
//!
//! ```text
//! ; t is seconds since the start of the recording
//! (:t 0.000 :tracked t :pinching nil :tip (0.0 0.0 0.5) :palm (0.0 -0.05 0.5))
//! (:t 0.016 :tracked t :pinching t   :tip (0.0 0.0 0.5))
//! ```
//!
//! `:palm` defaults to the tip position; `:tracked` defaults to `t`;
//! `:pinching` defaults to `nil`. Every other joint sits at the palm.
//! `:reload-profile t` makes the hand re-read its gesture profile before
//! that frame.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::gesture::config::ProfileSource;
use crate::gesture::events::EventSink;
use crate::hand::joints::{HandJoint, HandSnapshot, JointPose};
use crate::hand::simulated::SimulatedHand;
use crate::sexp::{get_bool, get_float, get_vec3, list_items};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("malformed s-expression: {0}")]
    Parse(String),
    #[error("frame {frame}: missing or invalid :{key}")]
    MissingKey { frame: usize, key: &'static str },
    #[error("frame {frame}: time goes backwards")]
    NonMonotonic { frame: usize },
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
}

/// One scripted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub now: Duration,
    pub snapshot: HandSnapshot,
    pub reload_profile: bool,
}

/// Parse a frame script.
pub fn parse_script(raw: &str) -> Result<Vec<ReplayFrame>, ScriptError> {
    // Wrap the whole script so every top-level plist becomes a list item.
    let wrapped = format!("(\n{}\n)", raw);
    let value = lexpr::from_str(&wrapped).map_err(|e| ScriptError::Parse(e.to_string()))?;

    let mut frames: Vec<ReplayFrame> = Vec::new();
    for (i, item) in list_items(&value).into_iter().enumerate() {
        let now = get_float(item, "t")
            .and_then(|t| Duration::try_from_secs_f64(t).ok())
            .ok_or(ScriptError::MissingKey { frame: i, key: "t" })?;
        if frames.last().is_some_and(|prev| prev.now > now) {
            return Err(ScriptError::NonMonotonic { frame: i });
        }

        let tip = get_vec3(item, "tip").ok_or(ScriptError::MissingKey {
            frame: i,
            key: "tip",
        })?;
        let palm = get_vec3(item, "palm").unwrap_or(tip);
        let tracked = get_bool(item, "tracked").unwrap_or(true);
        let pinching = get_bool(item, "pinching").unwrap_or(false);
        let reload_profile = get_bool(item, "reload-profile").unwrap_or(false);

        let mut snapshot = HandSnapshot::uniform(tracked, pinching, palm);
        snapshot.set_joint(HandJoint::IndexTip, JointPose::at(tip));
        frames.push(ReplayFrame {
            now,
            snapshot,
            reload_profile,
        });
    }
    Ok(frames)
}

/// Read and parse a frame script file.
pub fn load_script(path: &Path) -> Result<Vec<ReplayFrame>, ScriptError> {
    let raw = std::fs::read_to_string(path)?;
    parse_script(&raw)
}

/// Feed every frame to `hand`, calling `after_frame` once per frame.
pub fn run<P, S, F>(hand: &mut SimulatedHand<P, S>, frames: Vec<ReplayFrame>, mut after_frame: F)
where
    P: ProfileSource,
    S: EventSink,
    F: FnMut(usize, &mut SimulatedHand<P, S>),
{
    let total = frames.len();
    for (i, frame) in frames.into_iter().enumerate() {
        if frame.reload_profile {
            hand.refresh_config();
        }
        hand.update(frame.snapshot, frame.now);
        after_frame(i, hand);
    }
    debug!("replayed {} frames", total);
}
