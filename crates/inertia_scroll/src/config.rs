//! Scroll tuning
//!
//! Every constant that shapes the feel of a scroll lives here. None of them
//! are derived from physics; they are tuned by hand, so each one is exposed
//! as a field with the tuned value as its default.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Fraction of an out-of-range drag that is published (rubber-band resistance)
pub const ELASTICITY: f64 = 0.43;
/// Divisor applied per reference frame to an overshoot while settling
pub const BOUNCE_SPEED: f64 = 1.15;
/// Release displacement to per-frame velocity
pub const SPEED_FACTOR: f64 = 0.135;
/// Default tick rate
pub const DEFAULT_FPS: f64 = 60.0;
/// Largest overshoot past an edge during momentum
pub const MAX_OVERSHOOT: f64 = 100.0;
/// Overshoot target as a multiple of the crossing velocity
pub const OVERSHOOT_REACH: f64 = 7.0;
/// Per-frame velocity under which momentum stops
pub const REST_VELOCITY: f64 = 0.01;

/// Thresholds that classify a release as a flick
///
/// Platforms disagree on these, so the three presets are kept side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickTiming {
    /// How far back from the release the sample history is inspected (ms)
    pub sample_window_ms: f64,
    /// A drag older than this restarts its velocity measurement (ms)
    pub gesture_window_ms: f64,
    /// Releases of gestures longer than this carry no momentum (ms)
    pub max_gesture_ms: f64,
    /// Displacement that makes a release with few samples a flick (px)
    pub flick_distance: f64,
    /// Below this many samples the displacement rule applies
    pub few_samples: usize,
}

impl FlickTiming {
    /// Desktop / default timing
    pub fn desktop() -> Self {
        Self {
            sample_window_ms: 300.0,
            gesture_window_ms: 300.0,
            max_gesture_ms: 700.0,
            flick_distance: 70.0,
            few_samples: 3,
        }
    }

    /// iOS-style timing: short window, short gestures
    pub fn ios() -> Self {
        Self {
            sample_window_ms: 150.0,
            gesture_window_ms: 150.0,
            max_gesture_ms: 300.0,
            ..Self::desktop()
        }
    }

    /// Android-style timing
    pub fn android() -> Self {
        Self {
            sample_window_ms: 300.0,
            gesture_window_ms: 300.0,
            max_gesture_ms: 500.0,
            ..Self::desktop()
        }
    }
}

impl Default for FlickTiming {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Configuration for scroll behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Overshoot and settle back at edges (default: true)
    pub use_bounce: bool,
    /// Dead zone a drag must leave before it moves anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_threshold: Option<f64>,
    /// Tick rate the host drives the engine at
    pub fps: f64,
    /// Tick rate the per-frame constants were tuned for
    pub reference_fps: f64,
    pub elasticity: f64,
    pub bounce_speed: f64,
    pub speed_factor: f64,
    pub max_overshoot: f64,
    pub overshoot_reach: f64,
    pub rest_velocity: f64,
    pub timing: FlickTiming,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            use_bounce: true,
            move_threshold: None,
            fps: DEFAULT_FPS,
            reference_fps: DEFAULT_FPS,
            elasticity: ELASTICITY,
            bounce_speed: BOUNCE_SPEED,
            speed_factor: SPEED_FACTOR,
            max_overshoot: MAX_OVERSHOOT,
            overshoot_reach: OVERSHOOT_REACH,
            rest_velocity: REST_VELOCITY,
            timing: FlickTiming::default(),
        }
    }
}

impl ScrollConfig {
    /// Create config with bounce disabled
    pub fn no_bounce() -> Self {
        Self {
            use_bounce: false,
            ..Default::default()
        }
    }

    /// Create config with iOS-style flick timing
    pub fn ios() -> Self {
        Self {
            timing: FlickTiming::ios(),
            ..Default::default()
        }
    }

    /// Create config with Android-style flick timing
    pub fn android() -> Self {
        Self {
            timing: FlickTiming::android(),
            ..Default::default()
        }
    }

    /// Look up a preset by name (`desktop`, `ios`, `android`, `no_bounce`)
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "desktop" | "default" => Some(Self::default()),
            "ios" => Some(Self::ios()),
            "android" => Some(Self::android()),
            "no_bounce" => Some(Self::no_bounce()),
            _ => None,
        }
    }

    /// Milliseconds between ticks
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Scale from reference frames to actual frames
    pub fn frame_ratio(&self) -> f64 {
        self.reference_fps / self.fps
    }

    /// Replace values the engine cannot run with by their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.fps.is_finite() && self.fps > 0.0) {
            self.fps = defaults.fps;
        }
        if !(self.reference_fps.is_finite() && self.reference_fps > 0.0) {
            self.reference_fps = defaults.reference_fps;
        }
        if !(self.elasticity.is_finite() && self.elasticity > 0.0 && self.elasticity <= 1.0) {
            self.elasticity = defaults.elasticity;
        }
        if !(self.bounce_speed.is_finite() && self.bounce_speed > 1.0) {
            self.bounce_speed = defaults.bounce_speed;
        }
        if !(self.speed_factor.is_finite() && self.speed_factor >= 0.0) {
            self.speed_factor = defaults.speed_factor;
        }
        if !(self.max_overshoot.is_finite() && self.max_overshoot >= 0.0) {
            self.max_overshoot = defaults.max_overshoot;
        }
        if !(self.overshoot_reach.is_finite() && self.overshoot_reach >= 1.0) {
            self.overshoot_reach = defaults.overshoot_reach;
        }
        if !(self.rest_velocity.is_finite() && self.rest_velocity >= 0.0) {
            self.rest_velocity = defaults.rest_velocity;
        }
        self.move_threshold = self
            .move_threshold
            .filter(|t| t.is_finite() && *t > 0.0);
        self
    }

    /// Check every tuning value, reporting the first bad one
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<()> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if !(self.fps.is_finite() && self.fps > 0.0) {
            return invalid("fps", format!("must be positive, got {}", self.fps));
        }
        if !(self.reference_fps.is_finite() && self.reference_fps > 0.0) {
            return invalid(
                "reference_fps",
                format!("must be positive, got {}", self.reference_fps),
            );
        }
        if !(self.elasticity.is_finite() && self.elasticity > 0.0 && self.elasticity <= 1.0) {
            return invalid(
                "elasticity",
                format!("must be in (0, 1], got {}", self.elasticity),
            );
        }
        if !(self.bounce_speed.is_finite() && self.bounce_speed > 1.0) {
            return invalid(
                "bounce_speed",
                format!("must be greater than 1, got {}", self.bounce_speed),
            );
        }
        if !(self.speed_factor.is_finite() && self.speed_factor >= 0.0) {
            return invalid(
                "speed_factor",
                format!("must not be negative, got {}", self.speed_factor),
            );
        }
        if !(self.max_overshoot.is_finite() && self.max_overshoot >= 0.0) {
            return invalid(
                "max_overshoot",
                format!("must not be negative, got {}", self.max_overshoot),
            );
        }
        if !(self.overshoot_reach.is_finite() && self.overshoot_reach >= 1.0) {
            return invalid(
                "overshoot_reach",
                format!("must be at least 1, got {}", self.overshoot_reach),
            );
        }
        if !(self.rest_velocity.is_finite() && self.rest_velocity >= 0.0) {
            return invalid(
                "rest_velocity",
                format!("must not be negative, got {}", self.rest_velocity),
            );
        }
        if let Some(threshold) = self.move_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return invalid(
                    "move_threshold",
                    format!("must not be negative, got {threshold}"),
                );
            }
        }

        let timing = &self.timing;
        for (field, value) in [
            ("timing.sample_window_ms", timing.sample_window_ms),
            ("timing.gesture_window_ms", timing.gesture_window_ms),
            ("timing.max_gesture_ms", timing.max_gesture_ms),
            ("timing.flick_distance", timing.flick_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(field, format!("must not be negative, got {value}"));
            }
        }

        Ok(())
    }

    /// Parse a config from TOML. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: ScrollConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
