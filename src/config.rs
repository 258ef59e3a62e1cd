//! Widget configuration.
//!
//! Hosts describe a widget with the same props the browser component takes,
//! as a camelCase JSON object. Missing fields fall back to defaults and
//! out-of-range values are replaced by [`AnnotatorConfig::sanitize`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_DISC_RADIUS, DEFAULT_HEIGHT_ZOOM};
use crate::error::{AnnotatorError, Result};
use crate::model::{ShapeInput, ShapeKind, parse_shapes};

/// Log level setting for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Which flavour of the widget to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WidgetVariant {
    /// Every shape kind plus the playback marker.
    #[default]
    Annotator,
    /// Rectangles, polygons and circles; no playback marker.
    Editor,
}

impl WidgetVariant {
    /// Shape kinds that can be plotted and drawn.
    pub fn enabled_kinds(&self) -> &'static [ShapeKind] {
        match self {
            WidgetVariant::Annotator => ShapeKind::all(),
            WidgetVariant::Editor => &[ShapeKind::Rectangle, ShapeKind::Polygon, ShapeKind::Circle],
        }
    }

    pub fn has_playback(&self) -> bool {
        matches!(self, WidgetVariant::Annotator)
    }
}

/// Construction props of a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatorConfig {
    /// Background image to annotate.
    #[serde(default)]
    pub image_url: String,

    /// Initial shapes, as loosely-typed objects.
    #[serde(default)]
    pub shapes: Vec<Value>,

    /// Show the image at its natural size instead of fitting it.
    #[serde(default)]
    pub natural_size: bool,

    /// Explicit viewport width; the container's size is used when absent.
    #[serde(default)]
    pub width: Option<f64>,

    /// Explicit viewport height; the container's size is used when absent.
    #[serde(default)]
    pub height: Option<f64>,

    /// Vertical stretch of the displayed image.
    #[serde(default = "default_height_zoom")]
    pub height_zoom: f64,

    /// Radius of edit handles and dots, in display pixels.
    #[serde(default = "default_disc_radius")]
    pub disc_radius: f64,

    #[serde(default)]
    pub hide_border: bool,

    /// Length of the clip the playback marker sweeps, in seconds.
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub variant: WidgetVariant,

    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_height_zoom() -> f64 {
    DEFAULT_HEIGHT_ZOOM
}

fn default_disc_radius() -> f64 {
    DEFAULT_DISC_RADIUS
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl AnnotatorConfig {
    /// Create a configuration with default values for an image.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            shapes: Vec::new(),
            natural_size: false,
            width: None,
            height: None,
            height_zoom: DEFAULT_HEIGHT_ZOOM,
            disc_radius: DEFAULT_DISC_RADIUS,
            hide_border: false,
            duration: 0.0,
            variant: WidgetVariant::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Deserialize configuration from JSON and sanitize it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitize())
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitize(mut self) -> Self {
        if !(self.disc_radius.is_finite() && self.disc_radius > 0.0) {
            log::warn!("Invalid discRadius {}, using {}", self.disc_radius, DEFAULT_DISC_RADIUS);
            self.disc_radius = DEFAULT_DISC_RADIUS;
        }
        if !(self.height_zoom.is_finite() && self.height_zoom > 0.0) {
            log::warn!("Invalid heightZoom {}, using {}", self.height_zoom, DEFAULT_HEIGHT_ZOOM);
            self.height_zoom = DEFAULT_HEIGHT_ZOOM;
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            log::warn!("Invalid duration {}, using 0", self.duration);
            self.duration = 0.0;
        }
        self
    }

    /// Check that the configuration can drive a widget.
    pub fn validate(&self) -> Result<()> {
        if self.image_url.trim().is_empty() {
            return Err(AnnotatorError::invalid_config("imageUrl is required"));
        }
        Ok(())
    }

    /// The initial shapes this configuration recognizes.
    pub fn initial_shapes(&self) -> Vec<ShapeInput> {
        parse_shapes(&self.shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = AnnotatorConfig::from_json(r#"{"imageUrl": "a.png"}"#).expect("parse");
        assert_eq!(config.image_url, "a.png");
        assert_eq!(config.disc_radius, DEFAULT_DISC_RADIUS);
        assert_eq!(config.height_zoom, DEFAULT_HEIGHT_ZOOM);
        assert_eq!(config.variant, WidgetVariant::Annotator);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_host_props_are_camel_case() {
        let json = r#"{
            "imageUrl": "frame.jpg",
            "naturalSize": true,
            "width": 800,
            "heightZoom": 2,
            "discRadius": 3,
            "hideBorder": true,
            "duration": 12.5,
            "variant": "editor",
            "logLevel": "debug",
            "shapes": [{"type": "dot", "position": [1, 2]}, {"type": "blob"}]
        }"#;
        let config = AnnotatorConfig::from_json(json).expect("parse");
        assert!(config.natural_size);
        assert_eq!(config.width, Some(800.0));
        assert_eq!(config.height, None);
        assert_eq!(config.height_zoom, 2.0);
        assert_eq!(config.disc_radius, 3.0);
        assert!(config.hide_border);
        assert_eq!(config.duration, 12.5);
        assert_eq!(config.variant, WidgetVariant::Editor);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.initial_shapes().len(), 1);
    }

    #[test]
    fn test_sanitize_replaces_bad_values() {
        let json = r#"{"imageUrl": "a.png", "discRadius": -1, "heightZoom": 0, "duration": -5}"#;
        let config = AnnotatorConfig::from_json(json).expect("parse");
        assert_eq!(config.disc_radius, DEFAULT_DISC_RADIUS);
        assert_eq!(config.height_zoom, DEFAULT_HEIGHT_ZOOM);
        assert_eq!(config.duration, 0.0);
    }

    #[test]
    fn test_missing_image_is_invalid() {
        let config = AnnotatorConfig::default();
        assert!(matches!(
            config.validate(),
            Err(AnnotatorError::InvalidConfig { .. })
        ));
        assert!(AnnotatorConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_variant_capabilities() {
        assert_eq!(WidgetVariant::Annotator.enabled_kinds().len(), 5);
        assert!(!WidgetVariant::Editor.enabled_kinds().contains(&ShapeKind::Ellipse));
        assert!(!WidgetVariant::Editor.enabled_kinds().contains(&ShapeKind::Dot));
        assert!(WidgetVariant::Annotator.has_playback());
        assert!(!WidgetVariant::Editor.has_playback());
    }
}
