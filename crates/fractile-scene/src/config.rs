#![forbid(unsafe_code)]

//! Scene tuning as data.
//!
//! Every field has a default matching the stock fraction scene, so
//! `SceneConfig::default()` lays out and behaves like the built-in widget.
//!
//! # Loading
//!
//! ```toml
//! # fractile-scene.toml
//! drop_threshold = 80.0
//!
//! [bucket]
//! center = { x = 0.0, y = 120.0 }
//!
//! [motion]
//! stiffness = 300.0
//! ```
//!
//! ```rust,ignore
//! let config = SceneConfig::from_toml_file("fractile-scene.toml")?;
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;

use fractile_core::geometry::{Point, Size};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Layout, thresholds, and motion tuning for a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Horizontal gap between containers.
    pub container_spacing: f64,

    /// Scene point the container row is centred on.
    pub container_anchor: Point,

    /// Scene position of the overlay frame's origin.
    pub overlay_origin: Point,

    pub bucket: BucketConfig,

    /// Farthest a released piece may be from a cell and still land in it.
    pub drop_threshold: f64,

    /// Farthest a dragged piece may be from a cell to be hinted toward it.
    pub hint_threshold: f64,

    /// Footprint of a rectangular container.
    pub rectangular_size: Size,

    /// Radius of a circular container.
    pub circular_radius: f64,

    pub motion: MotionConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            container_spacing: 10.0,
            container_anchor: Point::new(0.0, -150.0),
            overlay_origin: Point::ORIGIN,
            bucket: BucketConfig::default(),
            drop_threshold: 100.0,
            hint_threshold: 100.0,
            rectangular_size: Size::new(50.0, 200.0),
            circular_radius: 60.0,
            motion: MotionConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
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
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every parameter. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.container_spacing.is_finite() && self.container_spacing >= 0.0) {
            errors.push(format!(
                "container_spacing must be >= 0, got {}",
                self.container_spacing
            ));
        }
        for (name, point) in [
            ("container_anchor", self.container_anchor),
            ("overlay_origin", self.overlay_origin),
            ("bucket.center", self.bucket.center),
        ] {
            if !point.is_finite() {
                errors.push(format!("{name} must be finite, got {point:?}"));
            }
        }
        for (name, value) in [
            ("drop_threshold", self.drop_threshold),
            ("hint_threshold", self.hint_threshold),
            ("circular_radius", self.circular_radius),
            ("motion.stiffness", self.motion.stiffness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        }
        if !(self.motion.damping.is_finite() && self.motion.damping >= 0.0) {
            errors.push(format!(
                "motion.damping must be >= 0, got {}",
                self.motion.damping
            ));
        }
        for (name, size) in [
            ("rectangular_size", self.rectangular_size),
            ("bucket.size", self.bucket.size),
        ] {
            if size.is_empty() || !(size.width.is_finite() && size.height.is_finite()) {
                errors.push(format!("{name} must be non-empty, got {size:?}"));
            }
        }

        errors
    }

    /// `self`, or every violation found by [`validate`](Self::validate).
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Where the piece reservoir sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    pub center: Point,
    pub size: Size,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            center: Point::new(0.0, 100.0),
            size: Size::new(300.0, 100.0),
        }
    }
}

/// Spring tuning for piece motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub stiffness: f64,
    pub damping: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        // Critically damped: damping = 2 * sqrt(stiffness).
        Self {
            stiffness: 400.0,
            damping: 40.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
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
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
