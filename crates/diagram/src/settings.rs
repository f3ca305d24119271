//! Diagram settings loaded from TOML

use crate::router::LayoutMetrics;
use crate::style::{MARKER_SIZE, STROKE_WIDTH};
use schemaboard_core::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Canvas interaction tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Scale multiplier applied per wheel notch
    pub wheel_zoom_factor: f64,
    /// Screen distance a pointer must travel before a press becomes a drag
    pub drag_threshold: f64,
    pub stroke_width: f64,
    pub marker_size: f64,
    /// Screen padding used when fitting the diagram into the viewport
    pub fit_padding: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            wheel_zoom_factor: 1.1,
            drag_threshold: 4.0,
            stroke_width: STROKE_WIDTH,
            marker_size: MARKER_SIZE,
            fit_padding: 40.0,
        }
    }
}

/// All diagram settings
///
/// ```toml
/// [canvas]
/// wheel_zoom_factor = 1.2
///
/// [layout]
/// row_height = 28.0
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    pub canvas: CanvasSettings,
    pub layout: LayoutMetrics,
}

impl DiagramSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SchemaError::config(format!("invalid diagram settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded diagram settings");
        Ok(settings)
    }

    /// Render settings as TOML
    pub fn to_toml_string(&self) -> SchemaResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SchemaError::config(format!("cannot serialize settings: {}", e)))
    }

    fn validate(&self) -> SchemaResult<()> {
        let canvas = &self.canvas;
        let layout = &self.layout;

        if !(canvas.wheel_zoom_factor.is_finite() && canvas.wheel_zoom_factor > 1.0) {
            return Err(SchemaError::config("canvas.wheel_zoom_factor must be greater than 1"));
        }
        let non_negative = [
            ("canvas.drag_threshold", canvas.drag_threshold),
            ("canvas.fit_padding", canvas.fit_padding),
            ("layout.header_height", layout.header_height),
            ("layout.control_offset", layout.control_offset),
            ("layout.menu_anchor_offset", layout.menu_anchor_offset),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SchemaError::config(format!("{} must be a non-negative number", name)));
            }
        }
        let positive = [
            ("canvas.stroke_width", canvas.stroke_width),
            ("canvas.marker_size", canvas.marker_size),
            ("layout.row_height", layout.row_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SchemaError::config(format!("{} must be a positive number", name)));
            }
        }
        Ok(())
    }
}
