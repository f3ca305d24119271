//! Relationship line overflow menu
//!
//! Each routed line carries a small menu anchor at its midpoint. The anchor
//! goes from idle to hover when the pointer enters it, opens on click, and
//! closes again on a selection or a click elsewhere.

use schemaboard_core::{RelationType, RelationshipId};
use schemaboard_graph::SchemaCommand;
use tracing::trace;

/// Entry offered by an open line menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ChangeType(RelationType),
    Delete,
}

impl MenuAction {
    pub fn label(&self) -> String {
        match self {
            MenuAction::ChangeType(kind) => format!("Change to {}", kind.display_name()),
            MenuAction::Delete => "Delete relationship".to_string(),
        }
    }
}

/// Actions for a line of the given type: the two other types, then delete
pub fn menu_actions(current: RelationType) -> Vec<MenuAction> {
    RelationType::all()
        .iter()
        .filter(|kind| **kind != current)
        .map(|kind| MenuAction::ChangeType(*kind))
        .chain(std::iter::once(MenuAction::Delete))
        .collect()
}

/// Pointer input routed to the line menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMenuEvent {
    PointerEnter(RelationshipId),
    PointerLeave,
    Click,
    Select(MenuAction),
    OutsideClick,
}

/// State of the line menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineMenuState {
    #[default]
    Idle,
    Hover(RelationshipId),
    MenuOpen(RelationshipId),
}

impl LineMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relationship whose anchor is hovered or open
    pub fn active_relationship(&self) -> Option<RelationshipId> {
        match self {
            LineMenuState::Idle => None,
            LineMenuState::Hover(id) | LineMenuState::MenuOpen(id) => Some(*id),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LineMenuState::MenuOpen(_))
    }

    /// Advance the state machine
    ///
    /// A selection in an open menu yields the command to apply.
    pub fn handle(&mut self, event: LineMenuEvent) -> Option<SchemaCommand> {
        let previous = *self;
        let (next, command) = match (previous, event) {
            (LineMenuState::Idle, LineMenuEvent::PointerEnter(id)) => {
                (LineMenuState::Hover(id), None)
            }
            (LineMenuState::Hover(_), LineMenuEvent::PointerEnter(id)) => {
                (LineMenuState::Hover(id), None)
            }
            (LineMenuState::Hover(_), LineMenuEvent::PointerLeave) => (LineMenuState::Idle, None),
            (LineMenuState::Hover(id), LineMenuEvent::Click) => (LineMenuState::MenuOpen(id), None),
            (LineMenuState::MenuOpen(id), LineMenuEvent::Select(action)) => {
                (LineMenuState::Idle, Some(command_for(id, action)))
            }
            (LineMenuState::MenuOpen(_), LineMenuEvent::OutsideClick) => {
                (LineMenuState::Idle, None)
            }
            (state, _) => (state, None),
        };

        if next != previous {
            trace!(from = ?previous, to = ?next, "line menu transition");
        }
        *self = next;
        command
    }
}

fn command_for(relationship_id: RelationshipId, action: MenuAction) -> SchemaCommand {
    match action {
        MenuAction::ChangeType(relation_type) => SchemaCommand::ChangeRelationshipType {
            relationship_id,
            relation_type,
        },
        MenuAction::Delete => SchemaCommand::DeleteRelationship { relationship_id },
    }
}
