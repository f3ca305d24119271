//! Canvas pan/zoom transform
//!
//! Maps between screen space (pointer coordinates) and world space (table
//! coordinates): `screen = world * scale + offset`.

use schemaboard_core::{Position, Rect, Size};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Minimum zoom level (40%)
pub const MIN_SCALE: f64 = 0.4;

/// Maximum zoom level (500%)
pub const MAX_SCALE: f64 = 5.0;

/// Grid size for snapping
pub const GRID_SIZE: f64 = 20.0;

/// Snap a world position to the nearest grid intersection
pub fn snap_to_grid(world: Position) -> Position {
    Position::new(
        (world.x / GRID_SIZE).round() * GRID_SIZE,
        (world.y / GRID_SIZE).round() * GRID_SIZE,
    )
}

// ============================================================================
// CanvasTransform
// ============================================================================

/// Pan and zoom state of the canvas
///
/// Deserialized state goes through `with_state`, so the scale bounds hold for
/// persisted transforms too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TransformState {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl<'de> Deserialize<'de> for CanvasTransform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = TransformState::deserialize(deserializer)?;
        Ok(Self::with_state(state.scale, state.offset_x, state.offset_y))
    }
}

impl CanvasTransform {
    /// Create an identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with explicit state
    ///
    /// The scale is clamped; a non-finite or non-positive scale becomes 1 and
    /// non-finite offsets become 0.
    pub fn with_state(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            offset_x: finite(offset_x),
            offset_y: finite(offset_y),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen-space translation of the world origin
    pub fn offset(&self) -> Position {
        Position::new(self.offset_x, self.offset_y)
    }

    // ========================================================================
    // Zoom and Pan
    // ========================================================================

    /// Multiply the scale, keeping the world point under `center` fixed
    ///
    /// Without a center only the scale changes. A zoom that does not change
    /// the (clamped) scale leaves the transform untouched.
    pub fn zoom(&mut self, multiplier: f64, center: Option<Position>) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return;
        }

        let new_scale = (self.scale * multiplier).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.scale {
            return;
        }

        if let Some(center) = center {
            let world = self.screen_to_world(center);
            self.offset_x = center.x - world.x * new_scale;
            self.offset_y = center.y - world.y * new_scale;
        }
        self.scale = new_scale;
    }

    /// Zoom by one wheel notch: negative `delta_y` zooms in by `factor`
    pub fn wheel_zoom(&mut self, delta_y: f64, center: Position, factor: f64) {
        if delta_y < 0.0 {
            self.zoom(factor, Some(center));
        } else if delta_y > 0.0 {
            self.zoom(1.0 / factor, Some(center));
        }
    }

    /// Translate by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Reset to scale 1 at the origin
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit a world rectangle into a viewport, centered, with padding
    pub fn fit_rect(&mut self, world: Rect, viewport: Size, padding: f64) {
        let available_w = (viewport.width - 2.0 * padding).max(1.0);
        let available_h = (viewport.height - 2.0 * padding).max(1.0);
        let fit = (available_w / world.size.width).min(available_h / world.size.height);
        let scale = if fit.is_finite() && fit > 0.0 { fit } else { 1.0 };

        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let center = world.center();
        self.offset_x = viewport.width / 2.0 - center.x * self.scale;
        self.offset_y = viewport.height / 2.0 - center.y * self.scale;
    }

    // ========================================================================
    // Coordinate Transformations
    // ========================================================================

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    /// Convert world coordinates to screen coordinates
    pub fn world_to_screen(&self, world: Position) -> Position {
        Position::new(
            world.x * self.scale + self.offset_x,
            world.y * self.scale + self.offset_y,
        )
    }

    /// Snap a world position to the grid
    pub fn snap_to_grid(&self, world: Position) -> Position {
        snap_to_grid(world)
    }

    /// CSS transform for the world container
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.offset_x, self.offset_y, self.scale
        )
    }
}

// ============================================================================
// Pinch Gesture
// ============================================================================

/// Two-finger pinch: zoom by the distance ratio around the midpoint, pan by
/// the midpoint movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    last_distance: f64,
    last_midpoint: Position,
}

impl PinchGesture {
    /// Start a pinch from two screen-space touch points
    pub fn begin(a: Position, b: Position) -> Self {
        Self {
            last_distance: a.distance_to(&b),
            last_midpoint: a.midpoint(&b),
        }
    }

    /// Apply the movement of both touch points to the transform
    pub fn update(&mut self, a: Position, b: Position, transform: &mut CanvasTransform) {
        let distance = a.distance_to(&b);
        let midpoint = a.midpoint(&b);

        transform.pan(
            midpoint.x - self.last_midpoint.x,
            midpoint.y - self.last_midpoint.y,
        );
        if self.last_distance > 0.0 && distance > 0.0 {
            transform.zoom(distance / self.last_distance, Some(midpoint));
        }

        self.last_distance = distance;
        self.last_midpoint = midpoint;
    }
}

// ============================================================================
// Tests
// ============================================================================
