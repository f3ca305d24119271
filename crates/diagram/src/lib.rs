//! # Schemaboard Diagram
//!
//! Geometry for the schema canvas.
//!
//! - **transform**: pan/zoom between screen and world space, pinch gestures
//! - **drag**: live table dragging with grid-snapped commits
//! - **router**: bezier paths for relationship lines
//! - **style**: colors and end markers per relationship type
//! - **interaction**: the overflow menu on each line
//! - **settings**: TOML-configurable canvas and layout numbers

pub mod drag;
pub mod interaction;
pub mod router;
pub mod settings;
pub mod style;
pub mod transform;

pub use drag::{DragOutcome, TableDrag};
pub use interaction::{menu_actions, LineMenuEvent, LineMenuState, MenuAction};
pub use router::{LayoutMetrics, RelationshipRouter, RoutedPath};
pub use settings::{CanvasSettings, DiagramSettings};
pub use style::{relationship_color, relationship_style, scaled_size, Marker, RelationshipStyle};
pub use transform::{snap_to_grid, CanvasTransform, PinchGesture, GRID_SIZE, MAX_SCALE, MIN_SCALE};
