#![forbid(unsafe_code)]

//! Carousel configuration.
//!
//! [`CarouselConfig`] mirrors the options a host page passes to the widget.
//! Every field has a default, and the state machine accepts any value: odd
//! settings are absorbed (a non-positive interval simply disables
//! auto-advance). [`CarouselConfig::validate`] exists for file-driven setups
//! that want to reject typos early.
//!
//! # Loading
//!
//! With the `config-file` feature the config loads from TOML or JSON. Keys use
//! the option names hosts already know:
//!
//! ```toml
//! transitionSpeedMs = 350
//! transitionTimingFunction = "ease-out"
//! autoSlideIntervalMs = 4000
//! nextSlideDragSnapMouseTolerance = 25
//! enableTouchHandling = false
//! ```
//!
//! ```rust,ignore
//! let config = CarouselConfig::from_toml_file("carousel.toml")?;
//! let config = CarouselConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use crate::easing::TimingFunction;
use crate::event::InputModalities;
use crate::gesture::SnapTolerance;

/// Default settle/auto-advance animation duration.
pub const DEFAULT_TRANSITION_SPEED_MS: u32 = 500;
/// Default easing curve name.
pub const DEFAULT_TRANSITION_TIMING_FUNCTION: &str = "ease";
/// Default auto-advance interval.
pub const DEFAULT_AUTO_SLIDE_INTERVAL_MS: f64 = 1500.0;
/// Default share of the viewport (percent) a mouse drag must cover.
pub const DEFAULT_MOUSE_SNAP_TOLERANCE: f64 = 20.0;
/// Default share of the viewport (percent) a touch drag must cover.
pub const DEFAULT_TOUCH_SNAP_TOLERANCE: f64 = 15.0;

const MIN_AUTO_SLIDE_INTERVAL: Duration = Duration::from_nanos(1);

/// Options recognized by the carousel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default, rename_all = "camelCase"))]
pub struct CarouselConfig {
    /// Duration of the settle/auto-advance animation, in milliseconds.
    pub transition_speed_ms: u32,

    /// CSS easing curve name for that animation.
    pub transition_timing_function: String,

    /// Auto-advance tick interval in milliseconds. Non-positive or NaN
    /// disables auto-advance.
    pub auto_slide_interval_ms: f64,

    /// Percent of the viewport width a mouse drag must cover to commit.
    pub next_slide_drag_snap_mouse_tolerance: f64,

    /// Percent of the viewport width a touch drag must cover to commit.
    pub next_slide_drag_snap_touch_tolerance: f64,

    /// Whether mouse drag is wired up.
    pub enable_mouse_handling: bool,

    /// Whether touch drag is wired up.
    pub enable_touch_handling: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            transition_speed_ms: DEFAULT_TRANSITION_SPEED_MS,
            transition_timing_function: DEFAULT_TRANSITION_TIMING_FUNCTION.to_string(),
            auto_slide_interval_ms: DEFAULT_AUTO_SLIDE_INTERVAL_MS,
            next_slide_drag_snap_mouse_tolerance: DEFAULT_MOUSE_SNAP_TOLERANCE,
            next_slide_drag_snap_touch_tolerance: DEFAULT_TOUCH_SNAP_TOLERANCE,
            enable_mouse_handling: true,
            enable_touch_handling: true,
        }
    }
}

impl CarouselConfig {
    /// Auto-advance interval, or `None` when auto-advance is disabled.
    ///
    /// Zero, negative, NaN, infinite and unrepresentable values all disable.
    /// Positive values below one nanosecond round up to one nanosecond.
    #[must_use]
    pub fn auto_slide_interval(&self) -> Option<Duration> {
        let ms = self.auto_slide_interval_ms;
        if !ms.is_finite() || ms <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(ms / 1000.0)
            .ok()
            .map(|interval| interval.max(MIN_AUTO_SLIDE_INTERVAL))
    }

    /// Settle transition duration.
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.transition_speed_ms))
    }

    /// Parsed easing curve; unknown names fall back to `ease`.
    #[must_use]
    pub fn timing_function(&self) -> TimingFunction {
        TimingFunction::parse_or_default(&self.transition_timing_function)
    }

    /// Modalities whose drag handling is enabled.
    #[must_use]
    pub fn enabled_modalities(&self) -> InputModalities {
        let mut modalities = InputModalities::NONE;
        if self.enable_mouse_handling {
            modalities |= InputModalities::MOUSE;
        }
        if self.enable_touch_handling {
            modalities |= InputModalities::TOUCH;
        }
        modalities
    }

    /// Per-modality snap tolerances.
    #[must_use]
    pub fn snap_tolerance(&self) -> SnapTolerance {
        SnapTolerance {
            mouse_percent: self.next_slide_drag_snap_mouse_tolerance,
            touch_percent: self.next_slide_drag_snap_touch_tolerance,
        }
    }

    /// Validate all options are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            (
                "nextSlideDragSnapMouseTolerance",
                self.next_slide_drag_snap_mouse_tolerance,
            ),
            (
                "nextSlideDragSnapTouchTolerance",
                self.next_slide_drag_snap_touch_tolerance,
            ),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                errors.push(format!("{name} must be in [0, 100], got {value}"));
            }
        }

        if self.auto_slide_interval_ms.is_infinite() {
            errors.push(format!(
                "autoSlideIntervalMs must be finite, got {}",
                self.auto_slide_interval_ms
            ));
        }

        if TimingFunction::parse(&self.transition_timing_function).is_none() {
            errors.push(format!(
                "transitionTimingFunction is not a known easing: {:?}",
                self.transition_timing_function
            ));
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to TOML.
    #[cfg(feature = "config-file")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlEncode)
    }

    #[cfg(feature = "config-file")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a carousel configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[cfg(feature = "config-file")]
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config-file")]
    TomlEncode(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "config-file")]
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::TomlEncode(e) => write!(f, "TOML encode error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config-file")]
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::TomlEncode(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
