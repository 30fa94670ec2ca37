//! Gesture thresholds, durations and action bindings.
//!
//! The configuration is resolved lazily from a `ProfileSource` the first
//! time it is needed and cached for the lifetime of the owner. A missing
//! profile at that moment locks in the defaults; `force_refresh` is the
//! only way to ask the source again.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::sexp::{bool_sexp, escape_string, get_bool, get_float, get_int, get_keyword, get_list};

// ── Gesture kinds and actions ──────────────────────────────

/// The gestures a simulated hand can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Select,
    Hold,
    Manipulation,
    Navigation,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Hold => "hold",
            Self::Manipulation => "manipulation",
            Self::Navigation => "navigation",
        }
    }

    pub fn parse(s: &str) -> Option<GestureKind> {
        match s {
            "select" => Some(Self::Select),
            "hold" => Some(Self::Hold),
            "manipulation" => Some(Self::Manipulation),
            "navigation" => Some(Self::Navigation),
            _ => None,
        }
    }
}

/// An application-level action a gesture is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputAction {
    pub id: u32,
    pub description: String,
}

impl InputAction {
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }

    /// The unbound action.
    pub fn none() -> Self {
        Self::new(0, "None")
    }

    pub fn is_none(&self) -> bool {
        self.id == 0
    }
}

impl Default for InputAction {
    fn default() -> Self {
        Self::none()
    }
}

// ── Profile ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("malformed s-expression: {0}")]
    Parse(String),
    #[error("invalid value for :{key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unknown gesture kind: {0}")]
    UnknownKind(String),
    #[error("failed to read profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A gesture-to-action binding from the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureBinding {
    pub kind: GestureKind,
    pub action: InputAction,
}

/// External gesture profile, as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct GesturesProfile {
    /// Seconds the select signal must be held before Hold starts.
    pub hold_start_duration: f32,
    /// Fingertip travel (meters) that turns a press into movement.
    pub navigation_start_threshold: f32,
    /// Lock navigation to a single axis.
    pub use_rails_navigation: bool,
    pub gestures: Vec<GestureBinding>,
}

impl Default for GesturesProfile {
    fn default() -> Self {
        Self {
            hold_start_duration: 0.5,
            navigation_start_threshold: 0.03,
            use_rails_navigation: false,
            gestures: Vec::new(),
        }
    }
}

impl GesturesProfile {
    /// Parse a profile plist.
    ///
    /// ```text
    /// (:hold-start-duration 0.5
    ///  :navigation-start-threshold 0.03
    ///  :use-rails-navigation t
    ///  :gestures ((:kind :hold :id 3 :action "Hold")
    ///             (:kind :navigation :id 5 :action "Navigate")))
    /// ```
    ///
    /// Missing scalar keys keep the `Default` values.
    pub fn from_sexp(raw: &str) -> Result<Self, ProfileError> {
        let value = lexpr::from_str(raw).map_err(|e| ProfileError::Parse(e.to_string()))?;
        let mut profile = Self::default();

        if let Some(secs) = get_float(&value, "hold-start-duration") {
            profile.hold_start_duration = secs as f32;
        }
        if let Some(threshold) = get_float(&value, "navigation-start-threshold") {
            profile.navigation_start_threshold = threshold as f32;
        }
        if let Some(rails) = get_bool(&value, "use-rails-navigation") {
            profile.use_rails_navigation = rails;
        }

        for entry in get_list(&value, "gestures") {
            let kind_str = get_keyword(entry, "kind").ok_or_else(|| ProfileError::InvalidValue {
                key: "kind",
                reason: "missing in gesture binding".to_string(),
            })?;
            let kind = GestureKind::parse(&kind_str).ok_or(ProfileError::UnknownKind(kind_str))?;
            let id = get_int(entry, "id").unwrap_or(0);
            let id = u32::try_from(id).map_err(|_| ProfileError::InvalidValue {
                key: "id",
                reason: format!("{} is out of range", id),
            })?;
            let description = get_keyword(entry, "action").unwrap_or_else(|| "None".to_string());
            profile.gestures.push(GestureBinding {
                kind,
                action: InputAction::new(id, description),
            });
        }

        profile.validate()?;
        Ok(profile)
    }

    /// Check the scalar values as the recognizer will use them.
    pub fn validate(&self) -> Result<(), ProfileError> {
        hold_duration(self.hold_start_duration)?;
        let threshold = self.navigation_start_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ProfileError::InvalidValue {
                key: "navigation-start-threshold",
                reason: format!("{} is not a non-negative distance", threshold),
            });
        }
        Ok(())
    }

    /// Render back to the plist format accepted by `from_sexp`.
    pub fn to_sexp(&self) -> String {
        let gestures: Vec<String> = self
            .gestures
            .iter()
            .map(|g| {
                format!(
                    "(:kind :{} :id {} :action \"{}\")",
                    g.kind.as_str(),
                    g.action.id,
                    escape_string(&g.action.description)
                )
            })
            .collect();
        format!(
            "(:hold-start-duration {} :navigation-start-threshold {} :use-rails-navigation {} :gestures ({}))",
            self.hold_start_duration,
            self.navigation_start_threshold,
            bool_sexp(self.use_rails_navigation),
            gestures.join(" "),
        )
    }
}

fn hold_duration(secs: f32) -> Result<Duration, ProfileError> {
    Duration::try_from_secs_f32(secs).map_err(|_| ProfileError::InvalidValue {
        key: "hold-start-duration",
        reason: format!("{} is not a non-negative number of seconds", secs),
    })
}

// ── Resolved config ────────────────────────────────────────

/// Gesture configuration as used by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    pub hold_start_duration: Duration,
    pub navigation_start_threshold: f32,
    pub use_rails_navigation: bool,
    pub select_action: InputAction,
    pub hold_action: InputAction,
    pub manipulation_action: InputAction,
    pub navigation_action: InputAction,
}

impl Default for GestureConfig {
    /// Fallback when no profile is available: everything zero, rails off,
    /// every action unbound.
    fn default() -> Self {
        Self {
            hold_start_duration: Duration::ZERO,
            navigation_start_threshold: 0.0,
            use_rails_navigation: false,
            select_action: InputAction::none(),
            hold_action: InputAction::none(),
            manipulation_action: InputAction::none(),
            navigation_action: InputAction::none(),
        }
    }
}

impl GestureConfig {
    pub fn from_profile(profile: &GesturesProfile) -> Result<Self, ProfileError> {
        profile.validate()?;
        let mut config = Self {
            hold_start_duration: hold_duration(profile.hold_start_duration)?,
            navigation_start_threshold: profile.navigation_start_threshold,
            use_rails_navigation: profile.use_rails_navigation,
            ..Self::default()
        };
        for binding in &profile.gestures {
            let slot = match binding.kind {
                GestureKind::Select => &mut config.select_action,
                GestureKind::Hold => &mut config.hold_action,
                GestureKind::Manipulation => &mut config.manipulation_action,
                GestureKind::Navigation => &mut config.navigation_action,
            };
            *slot = binding.action.clone();
        }
        Ok(config)
    }

    /// Action bound to a gesture kind.
    pub fn action(&self, kind: GestureKind) -> &InputAction {
        match kind {
            GestureKind::Select => &self.select_action,
            GestureKind::Hold => &self.hold_action,
            GestureKind::Manipulation => &self.manipulation_action,
            GestureKind::Navigation => &self.navigation_action,
        }
    }

    /// Generate s-expression describing the resolved config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:hold-start-duration {:.3} :navigation-start-threshold {:.3} :use-rails-navigation {})",
            self.hold_start_duration.as_secs_f32(),
            self.navigation_start_threshold,
            bool_sexp(self.use_rails_navigation),
        )
    }
}

// ── Sources ────────────────────────────────────────────────

/// Where gesture profiles come from.
pub trait ProfileSource {
    /// The profile, if one is available right now.
    fn gestures_profile(&self) -> Option<GesturesProfile>;
}

impl<P: ProfileSource> ProfileSource for Option<P> {
    fn gestures_profile(&self) -> Option<GesturesProfile> {
        self.as_ref().and_then(ProfileSource::gestures_profile)
    }
}

impl<P: ProfileSource + ?Sized> ProfileSource for Box<P> {
    fn gestures_profile(&self) -> Option<GesturesProfile> {
        (**self).gestures_profile()
    }
}

impl ProfileSource for GesturesProfile {
    fn gestures_profile(&self) -> Option<GesturesProfile> {
        Some(self.clone())
    }
}

/// A profile stored as an s-expression file.
///
/// Read and parse failures are logged and reported as "no profile".
#[derive(Debug, Clone)]
pub struct SexpProfileFile {
    pub path: PathBuf,
}

impl SexpProfileFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and parse the file.
    pub fn load(&self) -> Result<GesturesProfile, ProfileError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| ProfileError::Io {
            path: self.path.clone(),
            source,
        })?;
        GesturesProfile::from_sexp(&raw)
    }
}

impl ProfileSource for SexpProfileFile {
    fn gestures_profile(&self) -> Option<GesturesProfile> {
        match self.load() {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("gesture profile unavailable: {}", e);
                None
            }
        }
    }
}

// ── Lazy resolver ──────────────────────────────────────────

/// One-shot lazy gesture configuration.
#[derive(Debug)]
pub struct LazyGestureConfig<P> {
    source: P,
    resolved: bool,
    used_defaults: bool,
    config: GestureConfig,
}

impl<P: ProfileSource> LazyGestureConfig<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            resolved: false,
            used_defaults: false,
            config: GestureConfig::default(),
        }
    }

    /// The configuration, reading the source on first use only.
    pub fn resolve(&mut self) -> &GestureConfig {
        if !self.resolved {
            self.resolved = true;
            match self.source.gestures_profile() {
                Some(profile) => match GestureConfig::from_profile(&profile) {
                    Ok(config) => {
                        self.config = config;
                        self.used_defaults = false;
                        debug!("gesture config resolved: {}", self.config.config_sexp());
                    }
                    Err(e) => {
                        self.config = GestureConfig::default();
                        self.used_defaults = true;
                        warn!("gesture profile rejected: {}; using zero thresholds", e);
                    }
                },
                None => {
                    self.config = GestureConfig::default();
                    self.used_defaults = true;
                    warn!("no gesture profile available; gestures use zero thresholds until refreshed");
                }
            }
        }
        &self.config
    }

    /// Forget the cached config so the next `resolve` reads the source again.
    pub fn force_refresh(&mut self) {
        self.resolved = false;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Whether the cached config is the fallback rather than a real profile.
    pub fn used_defaults(&self) -> bool {
        self.used_defaults
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }
}
