//! Table definitions
//!
//! A `Table` is a named card on the canvas: world-space geometry plus an
//! ordered column sequence. The column order drives relationship anchor rows.

use crate::column::TableColumn;
use schemaboard_core::{
    ColumnId, Identifiable, Named, Position, Positioned, Rect, Size, TableId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A table in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Unique identifier for this table
    pub id: TableId,

    /// Table name
    pub name: String,

    /// World-space x of the top-left corner
    pub x: f64,

    /// World-space y of the top-left corner
    pub y: f64,

    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    /// Ordered columns
    #[serde(default)]
    pub columns: Vec<TableColumn>,
}

fn default_width() -> f64 {
    Size::default_table().width
}

fn default_height() -> f64 {
    Size::default_table().height
}

impl Table {
    /// Create a new table with an `id UUID` primary key at the origin
    pub fn new(name: impl Into<String>) -> Self {
        let mut table = Self::empty(name);
        table.columns.push(TableColumn::default_primary_key());
        table
    }

    /// Create a new table without any columns
    pub fn empty(name: impl Into<String>) -> Self {
        let size = Size::default_table();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
            columns: Vec::new(),
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Place the table at a world position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the card size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Append a column
    pub fn with_column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    // ========================================================================
    // Column Queries
    // ========================================================================

    /// Get the primary key column, if the table has exactly one
    pub fn primary_key(&self) -> Option<&TableColumn> {
        let mut keys = self.columns.iter().filter(|c| c.is_primary_key);
        match (keys.next(), keys.next()) {
            (Some(pk), None) => Some(pk),
            _ => None,
        }
    }

    /// Get a column by id
    pub fn get_column(&self, id: ColumnId) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Get a column by name
    pub fn get_column_by_name(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column with the given name exists
    pub fn has_column_named(&self, name: &str) -> bool {
        self.get_column_by_name(name).is_some()
    }

    /// Position of a column in the column sequence
    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Columns shown in user-facing lists (system-generated ones excluded)
    pub fn visible_columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter().filter(|c| c.is_user_facing())
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Geometric center in world space
    pub fn center(&self) -> Position {
        self.bounds().center()
    }
}

impl Identifiable for Table {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Named for Table {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positioned for Table {
    fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    fn set_position(&mut self, position: Position) {
        self.x = position.x;
        self.y = position.y;
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.position(), self.size())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_has_primary_key() {
        let table = Table::new("user");
        assert_eq!(table.columns.len(), 1);
        let pk = table.primary_key().unwrap();
        assert_eq!(pk.name, "id");
    }

    #[test]
    fn test_primary_key_requires_exactly_one() {
        let empty = Table::empty("log");
        assert!(empty.primary_key().is_none());

        let twice = Table::new("pair").with_column(TableColumn::primary_key("code", "TEXT"));
        assert!(twice.primary_key().is_none());
    }

    #[test]
    fn test_column_lookup() {
        let email = TableColumn::new("email", "TEXT");
        let email_id = email.id;
        let table = Table::new("user").with_column(email);

        assert_eq!(table.column_index(email_id), Some(1));
        assert_eq!(table.get_column(email_id).unwrap().name, "email");
        assert!(table.has_column_named("email"));
        assert!(!table.has_column_named("phone"));
    }

    #[test]
    fn test_visible_columns_hide_system_generated() {
        let fk = TableColumn::new("user_id", "UUID").system_generated();
        let table = Table::new("order").with_column(fk);
        let names: Vec<_> = table.visible_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn test_geometry() {
        let mut table = Table::new("user").at(100.0, 40.0).with_size(200.0, 120.0);
        assert_eq!(table.center(), Position::new(200.0, 100.0));

        table.translate(20.0, 0.0);
        assert_eq!(table.position(), Position::new(120.0, 40.0));
    }

    #[test]
    fn test_missing_size_uses_defaults() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{id}","name":"user","x":10,"y":20}}"#);
        let table: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(table.size(), Size::default_table());
        assert!(table.columns.is_empty());
    }
}
