//! Relationship definitions
//!
//! A `Relationship` links a column of one table (the source, normally its
//! primary key) with a column of another (the target, normally the derived
//! foreign key).

use schemaboard_core::{
    ColumnId, DisplayColumnId, Identifiable, ReferentialAction, RelationType, RelationshipId,
    TableId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Relationship
// ============================================================================

/// A typed link between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Unique identifier for this relationship
    pub id: RelationshipId,

    /// Source table (holder of the referenced primary key)
    pub from_table_id: TableId,

    /// Target table (holder of the foreign key)
    pub to_table_id: TableId,

    /// Referenced column on the source table
    pub from_column_id: ColumnId,

    /// Foreign key column on the target table (target primary key for many-to-many)
    pub to_column_id: ColumnId,

    /// Cardinality
    #[serde(rename = "type")]
    pub relation_type: RelationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Action on delete
    #[serde(default)]
    pub on_delete: ReferentialAction,

    /// Action on update
    #[serde(default)]
    pub on_update: ReferentialAction,

    /// Legacy single display column hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_column_id: Option<DisplayColumnId>,

    /// Legacy single display column name hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_column_name: Option<String>,
}

impl Relationship {
    /// Create a new relationship between two table columns
    pub fn new(
        from_table_id: TableId,
        from_column_id: ColumnId,
        to_table_id: TableId,
        to_column_id: ColumnId,
        relation_type: RelationType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_table_id,
            to_table_id,
            from_column_id,
            to_column_id,
            relation_type,
            name: None,
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
            display_column_id: None,
            display_column_name: None,
        }
    }

    /// Apply creation options (name and referential actions)
    pub fn with_options(mut self, options: &RelationshipOptions) -> Self {
        self.name = options.name.clone();
        self.on_delete = options.on_delete;
        self.on_update = options.on_update;
        self
    }

    /// Set the relationship name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check if this relationship touches a table (as source or target)
    pub fn involves_table(&self, table_id: TableId) -> bool {
        self.from_table_id == table_id || self.to_table_id == table_id
    }

    /// Get the table on the other end
    pub fn other_table(&self, table_id: TableId) -> Option<TableId> {
        if self.from_table_id == table_id {
            Some(self.to_table_id)
        } else if self.to_table_id == table_id {
            Some(self.from_table_id)
        } else {
            None
        }
    }

    /// Check if both ends are the same table
    pub fn is_self_referential(&self) -> bool {
        self.from_table_id == self.to_table_id
    }

    /// Whether this relationship owns a derived foreign key column
    pub fn uses_foreign_key(&self) -> bool {
        self.relation_type.uses_foreign_key()
    }
}

impl Identifiable for Relationship {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// RelationshipOptions
// ============================================================================

/// Defaults applied when a relationship is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipOptions {
    #[serde(default)]
    pub name: Option<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl RelationshipOptions {
    /// Options for the drag-to-link path: CASCADE on delete and update
    pub fn auto_link() -> Self {
        Self {
            name: None,
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::Cascade,
        }
    }

    /// Options for the relationship dialog path: NO ACTION on delete and update
    pub fn manual() -> Self {
        Self {
            name: None,
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self::manual()
    }
}

// ============================================================================
// Tests
// ============================================================================
