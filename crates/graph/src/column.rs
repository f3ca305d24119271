//! Column definitions for tables
//!
//! A `TableColumn` is one row of a table card. Columns created by the engine
//! itself (derived foreign keys) are flagged `is_system_generated` and hidden
//! from user-facing column lists.

use schemaboard_core::{ColumnId, Identifiable, Named, TableId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// TableColumn
// ============================================================================

/// A column of a table (maps to a database column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Unique identifier for this column
    pub id: ColumnId,

    /// Column name as shown on the card
    pub name: String,

    /// SQL type name, e.g. "UUID" or "VARCHAR(255)"
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether this is the primary key
    #[serde(default)]
    pub is_primary_key: bool,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub is_nullable: bool,

    /// Whether values must be unique
    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_auto_increment: bool,

    #[serde(default)]
    pub is_auto_generate: bool,

    /// Whether this is a foreign key
    #[serde(default)]
    pub is_foreign_key: bool,

    /// Table referenced by this foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table_id: Option<TableId>,

    /// Column referenced by this foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_column_id: Option<ColumnId>,

    /// Whether the engine owns this column (hidden from user column lists)
    #[serde(default)]
    pub is_system_generated: bool,
}

impl TableColumn {
    /// Create a new nullable column with the given name and type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_nullable: true,
            is_unique: false,
            is_auto_increment: false,
            is_auto_generate: false,
            is_foreign_key: false,
            referenced_table_id: None,
            referenced_column_id: None,
            is_system_generated: false,
        }
    }

    /// Create a primary key column
    pub fn primary_key(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let mut column = Self::new(name, data_type);
        column.is_primary_key = true;
        column.is_nullable = false;
        column.is_unique = true;
        column.is_auto_generate = true;
        column
    }

    /// Create the default `id UUID` primary key
    pub fn default_primary_key() -> Self {
        Self::primary_key("id", "UUID")
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set a fixed id (used when rebuilding columns from external input)
    pub fn with_id(mut self, id: ColumnId) -> Self {
        self.id = id;
        self
    }

    /// Set nullability
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// Set uniqueness
    pub fn unique(mut self, unique: bool) -> Self {
        self.is_unique = unique;
        self
    }

    /// Mark as auto increment
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Mark as a foreign key referencing another table's column
    pub fn references(mut self, table_id: TableId, column_id: ColumnId) -> Self {
        self.is_foreign_key = true;
        self.referenced_table_id = Some(table_id);
        self.referenced_column_id = Some(column_id);
        self
    }

    /// Mark as owned by the engine
    pub fn system_generated(mut self) -> Self {
        self.is_system_generated = true;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether the column appears in user-facing column lists
    pub fn is_user_facing(&self) -> bool {
        !self.is_system_generated
    }

    /// Whether this column is a foreign key pointing at the given table/column pair
    pub fn references_column(&self, table_id: TableId, column_id: ColumnId) -> bool {
        self.is_foreign_key
            && self.referenced_table_id == Some(table_id)
            && self.referenced_column_id == Some(column_id)
    }
}

impl Identifiable for TableColumn {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Named for TableColumn {
    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Tests
// ============================================================================
