//! Core types used throughout Schemaboard
//!
//! Identifiers, world/screen geometry primitives and the enumerations shared
//! by the schema graph and the diagram layer.

use serde::{Deserialize, Serialize};

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Identifier of a table
pub type TableId = uuid::Uuid;

/// Identifier of a column (unique within the whole schema)
pub type ColumnId = uuid::Uuid;

/// Identifier of a relationship
pub type RelationshipId = uuid::Uuid;

/// Identifier of a relationship display column
pub type DisplayColumnId = uuid::Uuid;

// ============================================================================
// Geometry Types
// ============================================================================

/// A point in world or screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Calculate the Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Add an offset to this position
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Point halfway between two positions
    pub fn midpoint(&self, other: &Position) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Whether both coordinates are finite (neither NaN nor infinite)
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Width and height of a table card or viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Default size for a freshly created table card
    pub fn default_table() -> Self {
        Self {
            width: 250.0,
            height: 150.0,
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::default_table()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Create a rectangle from coordinates and dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Check if a point is contained within this rectangle
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }

    /// Get the center point of the rectangle
    pub fn center(&self) -> Position {
        Position {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    /// Left edge x
    pub fn left(&self) -> f64 {
        self.position.x
    }

    /// Right edge x
    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    /// Get the union of two rectangles (bounding box containing both)
    pub fn union(&self, other: &Rect) -> Self {
        let min_x = self.position.x.min(other.position.x);
        let min_y = self.position.y.min(other.position.y);
        let max_x = self.right().max(other.right());
        let max_y = (self.position.y + self.size.height).max(other.position.y + other.size.height);

        Self {
            position: Position::new(min_x, min_y),
            size: Size::new(max_x - min_x, max_y - min_y),
        }
    }
}

// ============================================================================
// Relationship Types
// ============================================================================

/// Cardinality of a relationship between two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    /// One record relates to exactly one other record
    OneToOne,
    /// One record relates to many others (e.g., user has many orders)
    #[default]
    OneToMany,
    /// Many-to-many through an implied junction table that is never built
    ManyToMany,
}

impl RelationType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "One to One",
            RelationType::OneToMany => "One to Many",
            RelationType::ManyToMany => "Many to Many",
        }
    }

    /// Short cardinality label
    pub fn label(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "1:1",
            RelationType::OneToMany => "1:N",
            RelationType::ManyToMany => "N:M",
        }
    }

    /// Wire name as persisted in snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "one-to-one",
            RelationType::OneToMany => "one-to-many",
            RelationType::ManyToMany => "many-to-many",
        }
    }

    /// Whether the relationship is carried by a foreign key on the target table
    pub fn uses_foreign_key(&self) -> bool {
        !matches!(self, RelationType::ManyToMany)
    }

    /// Get all relationship types
    pub fn all() -> &'static [RelationType] {
        &[
            RelationType::OneToOne,
            RelationType::OneToMany,
            RelationType::ManyToMany,
        ]
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Action taken on dependent rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    /// SQL keyword(s) for this action
    pub fn to_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }

    /// Get all referential actions
    pub fn all() -> &'static [ReferentialAction] {
        &[
            ReferentialAction::Cascade,
            ReferentialAction::SetNull,
            ReferentialAction::Restrict,
            ReferentialAction::NoAction,
        ]
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

// ============================================================================
// Tests
// ============================================================================
