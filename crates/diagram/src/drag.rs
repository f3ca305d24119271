//! Table dragging
//!
//! A drag keeps a live, unsnapped position for rendering and rerouting. The
//! snapped position is only committed when the pointer is released, and a
//! press that barely moved counts as a click.

use crate::transform::{snap_to_grid, CanvasTransform};
use schemaboard_core::{Position, TableId};
use schemaboard_graph::SchemaCommand;
use tracing::debug;

/// Screen distance below which a release is treated as a click
pub const DEFAULT_DRAG_THRESHOLD: f64 = 4.0;

/// Result of releasing a dragged table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The table moved to a grid-snapped position
    Moved { table_id: TableId, position: Position },
    /// The pointer stayed within the threshold
    Click { table_id: TableId, original: Position },
}

impl DragOutcome {
    pub fn table_id(&self) -> TableId {
        match self {
            DragOutcome::Moved { table_id, .. } | DragOutcome::Click { table_id, .. } => *table_id,
        }
    }

    /// Command that commits the new position, if the table moved
    pub fn command(&self) -> Option<SchemaCommand> {
        match self {
            DragOutcome::Moved { table_id, position } => Some(SchemaCommand::MoveTable {
                table_id: *table_id,
                x: position.x,
                y: position.y,
            }),
            DragOutcome::Click { .. } => None,
        }
    }
}

/// An in-progress table drag
#[derive(Debug, Clone, PartialEq)]
pub struct TableDrag {
    table_id: TableId,
    start_pointer: Position,
    original: Position,
    /// Pointer minus table position, in world space
    grab_offset: Position,
    live: Position,
    threshold: f64,
}

impl TableDrag {
    /// Start dragging a table from a pointer press
    pub fn begin(
        table_id: TableId,
        pointer_screen: Position,
        table_position: Position,
        transform: &CanvasTransform,
    ) -> Self {
        let pointer_world = transform.screen_to_world(pointer_screen);
        Self {
            table_id,
            start_pointer: pointer_screen,
            original: table_position,
            grab_offset: pointer_world - table_position,
            live: table_position,
            threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Position the table occupied before the drag
    pub fn original(&self) -> Position {
        self.original
    }

    /// Latest unsnapped position
    pub fn live_position(&self) -> Position {
        self.live
    }

    /// Follow the pointer and return the live world position
    pub fn update(&mut self, pointer_screen: Position, transform: &CanvasTransform) -> Position {
        self.live = transform.screen_to_world(pointer_screen) - self.grab_offset;
        self.live
    }

    /// Release the table
    pub fn finish(mut self, pointer_screen: Position, transform: &CanvasTransform) -> DragOutcome {
        let travelled = self.start_pointer.distance_to(&pointer_screen);
        if travelled < self.threshold {
            debug!(table = %self.table_id, travelled, "drag below threshold");
            return DragOutcome::Click {
                table_id: self.table_id,
                original: self.original,
            };
        }

        let position = snap_to_grid(self.update(pointer_screen, transform));
        debug!(table = %self.table_id, x = position.x, y = position.y, "drag finished");
        DragOutcome::Moved {
            table_id: self.table_id,
            position,
        }
    }
}
