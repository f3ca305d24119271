//! Visual encoding of relationship lines
//!
//! Color and end markers are a pure lookup keyed by relationship type.
//! Stroke width and marker size are divided by the canvas scale so lines keep
//! a constant on-screen size at every zoom level.

use crate::transform::MIN_SCALE;
use schemaboard_core::RelationType;
use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

/// Stroke width for relationship lines at scale 1
pub const STROKE_WIDTH: f64 = 2.0;

/// End marker size at scale 1
pub const MARKER_SIZE: f64 = 10.0;

/// Line colors per relationship type
pub mod colors {
    /// One-to-one relationship color
    pub const ONE_TO_ONE: &str = "#22c55e"; // green-500

    /// One-to-many relationship color
    pub const ONE_TO_MANY: &str = "#3b82f6"; // blue-500

    /// Many-to-many relationship color
    pub const MANY_TO_MANY: &str = "#f97316"; // orange-500
}

// ============================================================================
// Markers
// ============================================================================

/// Shape drawn at a line end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    Arrow,
    Circle,
    CrowsFoot,
}

/// Color and end markers of a relationship line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStyle {
    pub color: &'static str,
    pub start_marker: Marker,
    pub end_marker: Marker,
}

/// Look up the style of a relationship type
pub fn relationship_style(relation_type: RelationType) -> RelationshipStyle {
    match relation_type {
        RelationType::OneToOne => RelationshipStyle {
            color: colors::ONE_TO_ONE,
            start_marker: Marker::Arrow,
            end_marker: Marker::Arrow,
        },
        RelationType::OneToMany => RelationshipStyle {
            color: colors::ONE_TO_MANY,
            start_marker: Marker::Circle,
            end_marker: Marker::CrowsFoot,
        },
        RelationType::ManyToMany => RelationshipStyle {
            color: colors::MANY_TO_MANY,
            start_marker: Marker::CrowsFoot,
            end_marker: Marker::CrowsFoot,
        },
    }
}

/// Get the line color for a relationship type
pub fn relationship_color(relation_type: RelationType) -> &'static str {
    relationship_style(relation_type).color
}

/// World-space size that renders as `base` screen pixels at `scale`
pub fn scaled_size(base: f64, scale: f64) -> f64 {
    base / scale.max(MIN_SCALE)
}

// ============================================================================
// Tests
// ============================================================================
