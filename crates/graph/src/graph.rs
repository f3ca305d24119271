//! The schema graph
//!
//! `SchemaGraph` owns tables, relationships and display columns, and keeps
//! them consistent: every relationship carrying a foreign key has exactly one
//! derived column on its target table, every relationship has at most one
//! display column, and deletions cascade. Each operation validates everything
//! up front and only then mutates, so a rejected command leaves the graph
//! untouched.

use crate::column::TableColumn;
use crate::display_column::{
    self, RelationshipDisplayColumn, RelationshipDisplayField, ResolvedDisplayColumn,
};
use crate::foreign_key::{
    add_foreign_key_to_table, find_foreign_key_column, foreign_key_name, remove_foreign_key_column,
};
use crate::relationship::{Relationship, RelationshipOptions};
use crate::table::Table;
use indexmap::{IndexMap, IndexSet};
use schemaboard_core::{
    ColumnId, DisplayColumnId, ReferentialAction, RelationType, RelationshipId, SchemaError,
    SchemaResult, TableId,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// ============================================================================
// Operation Results
// ============================================================================

/// Everything produced by a successful `create_relationship`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipCreated {
    pub relationship: Relationship,
    pub display_column: RelationshipDisplayColumn,
    /// Target table after the foreign key column was attached
    pub target_table: Table,
}

/// Everything removed by a `delete_relationship`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDeleted {
    pub relationship: Relationship,
    pub removed_column: Option<TableColumn>,
    pub display_columns: Vec<RelationshipDisplayColumn>,
}

/// Everything removed by a `remove_table`
#[derive(Debug, Clone, PartialEq)]
pub struct TableRemoved {
    pub table: Table,
    pub relationships: Vec<Relationship>,
    pub display_columns: Vec<RelationshipDisplayColumn>,
}

// ============================================================================
// SchemaGraph
// ============================================================================

/// Tables, relationships and display columns, kept mutually consistent
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    pub(crate) tables: IndexMap<TableId, Table>,
    pub(crate) relationships: IndexMap<RelationshipId, Relationship>,
    pub(crate) display_columns: IndexMap<DisplayColumnId, RelationshipDisplayColumn>,
    relationships_by_table: HashMap<TableId, IndexSet<RelationshipId>>,
}

impl SchemaGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn table_map(&self) -> &IndexMap<TableId, Table> {
        &self.tables
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.get(&id)
    }

    pub fn relationship_map(&self) -> &IndexMap<RelationshipId, Relationship> {
        &self.relationships
    }

    pub fn display_columns(&self) -> impl Iterator<Item = &RelationshipDisplayColumn> {
        self.display_columns.values()
    }

    pub fn display_column(&self, id: DisplayColumnId) -> Option<&RelationshipDisplayColumn> {
        self.display_columns.get(&id)
    }

    pub fn display_column_map(&self) -> &IndexMap<DisplayColumnId, RelationshipDisplayColumn> {
        &self.display_columns
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Check if the graph has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Relationships touching a table (as source or target)
    pub fn relationships_for_table(&self, table_id: TableId) -> Vec<&Relationship> {
        self.relationships_by_table
            .get(&table_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.relationships.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stored display column of a relationship
    pub fn display_column_for_relationship(
        &self,
        relationship_id: RelationshipId,
    ) -> Option<&RelationshipDisplayColumn> {
        self.display_columns
            .values()
            .find(|c| c.relationship_id == relationship_id)
    }

    /// Stored display column of a relationship, or a synthesized one to commit
    pub fn resolve_display_column(
        &self,
        relationship_id: RelationshipId,
    ) -> SchemaResult<ResolvedDisplayColumn> {
        display_column::get_or_create(
            relationship_id,
            &self.relationships,
            &self.tables,
            &self.display_columns,
        )
    }

    /// Columns of a table shown in user-facing lists
    pub fn visible_columns(&self, table_id: TableId) -> SchemaResult<Vec<&TableColumn>> {
        Ok(self.require_table(table_id)?.visible_columns().collect())
    }

    fn require_table(&self, id: TableId) -> SchemaResult<&Table> {
        self.tables
            .get(&id)
            .ok_or_else(|| SchemaError::TableNotFound(id.to_string()))
    }

    fn require_relationship(&self, id: RelationshipId) -> SchemaResult<&Relationship> {
        self.relationships
            .get(&id)
            .ok_or_else(|| SchemaError::RelationshipNotFound(id.to_string()))
    }

    // ========================================================================
    // Relationship Index
    // ========================================================================

    fn index_relationship(&mut self, relationship: &Relationship) {
        for table_id in [relationship.from_table_id, relationship.to_table_id] {
            self.relationships_by_table
                .entry(table_id)
                .or_default()
                .insert(relationship.id);
        }
    }

    fn unindex_relationship(&mut self, relationship: &Relationship) {
        for table_id in [relationship.from_table_id, relationship.to_table_id] {
            if let Some(ids) = self.relationships_by_table.get_mut(&table_id) {
                ids.shift_remove(&relationship.id);
                if ids.is_empty() {
                    self.relationships_by_table.remove(&table_id);
                }
            }
        }
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.relationships_by_table.clear();
        let relationships: Vec<Relationship> = self.relationships.values().cloned().collect();
        for relationship in &relationships {
            self.index_relationship(relationship);
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Add a table
    pub fn add_table(&mut self, table: Table) -> SchemaResult<()> {
        if self.tables.contains_key(&table.id) {
            return Err(SchemaError::DuplicateTable(table.id.to_string()));
        }

        debug!(table = %table.name, id = %table.id, "added table");
        self.tables.insert(table.id, table);
        Ok(())
    }

    /// Remove a table with every relationship touching it
    pub fn remove_table(&mut self, table_id: TableId) -> SchemaResult<TableRemoved> {
        self.require_table(table_id)?;

        let relationship_ids: Vec<RelationshipId> = self
            .relationships_by_table
            .get(&table_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        let mut relationships = Vec::new();
        let mut display_columns = Vec::new();
        for id in relationship_ids {
            if let Some(deleted) = self.detach_relationship(id) {
                relationships.push(deleted.relationship);
                display_columns.extend(deleted.display_columns);
            }
        }

        let stale: Vec<DisplayColumnId> = self
            .display_columns
            .values()
            .filter(|c| c.table_id == table_id || c.source_table_id == table_id)
            .map(|c| c.id)
            .collect();
        for id in stale {
            if let Some(column) = self.display_columns.shift_remove(&id) {
                display_columns.push(column);
            }
        }

        self.relationships_by_table.remove(&table_id);
        let table = self
            .tables
            .shift_remove(&table_id)
            .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))?;

        info!(
            table = %table.name,
            relationships = relationships.len(),
            display_columns = display_columns.len(),
            "removed table"
        );
        Ok(TableRemoved {
            table,
            relationships,
            display_columns,
        })
    }

    /// Write a committed (already snapped) position
    pub fn move_table(&mut self, table_id: TableId, x: f64, y: f64) -> SchemaResult<()> {
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))?;
        table.x = x;
        table.y = y;
        debug!(table = %table.name, x, y, "moved table");
        Ok(())
    }

    pub fn resize_table(&mut self, table_id: TableId, width: f64, height: f64) -> SchemaResult<()> {
        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))?;
        table.width = width.max(0.0);
        table.height = height.max(0.0);
        debug!(table = %table.name, width, height, "resized table");
        Ok(())
    }

    /// Rename a table and re-derive the foreign key columns that reference it
    pub fn rename_table(
        &mut self,
        table_id: TableId,
        new_name: impl Into<String>,
    ) -> SchemaResult<Table> {
        let new_name = new_name.into();
        let new_fk_name = foreign_key_name(&new_name);

        let mut renames: Vec<(TableId, ColumnId)> = Vec::new();
        for relationship in self.relationships_for_table(table_id) {
            if relationship.from_table_id != table_id || !relationship.uses_foreign_key() {
                continue;
            }
            let target = self.require_table(relationship.to_table_id)?;
            if let Some(fk) = find_foreign_key_column(target, relationship) {
                if target
                    .columns
                    .iter()
                    .any(|c| c.id != fk.id && c.name == new_fk_name)
                {
                    return Err(SchemaError::duplicate_column(&target.name, new_fk_name));
                }
                renames.push((target.id, fk.id));
            }
        }

        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))?;
        let old_name = std::mem::replace(&mut table.name, new_name);

        for (target_id, column_id) in renames {
            if let Some(column) = self
                .tables
                .get_mut(&target_id)
                .and_then(|t| t.columns.iter_mut().find(|c| c.id == column_id))
            {
                column.name = new_fk_name.clone();
            }
        }

        let table = self.require_table(table_id)?;
        debug!(from = %old_name, to = %table.name, "renamed table");
        Ok(table.clone())
    }

    /// Replace the user-facing columns of a table
    ///
    /// System-generated columns are kept after the new user columns. A table
    /// taking part in relationships must keep exactly one primary key and the
    /// key columns those relationships point at.
    pub fn update_table_columns(
        &mut self,
        table_id: TableId,
        columns: Vec<TableColumn>,
    ) -> SchemaResult<Table> {
        let table = self.require_table(table_id)?;

        let mut next: Vec<TableColumn> = columns.into_iter().filter(|c| c.is_user_facing()).collect();
        next.extend(table.columns.iter().filter(|c| c.is_system_generated).cloned());

        let mut seen = HashSet::new();
        for column in &next {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::duplicate_column(&table.name, &column.name));
            }
        }

        let related = self.relationships_for_table(table_id);
        if !related.is_empty() {
            let keys = next.iter().filter(|c| c.is_primary_key).count();
            let is_key = |id: ColumnId| next.iter().any(|c| c.id == id && c.is_primary_key);
            let keeps_endpoints = related.iter().all(|r| {
                let from_ok = r.from_table_id != table_id || is_key(r.from_column_id);
                let to_ok = r.to_table_id != table_id
                    || r.uses_foreign_key()
                    || is_key(r.to_column_id);
                from_ok && to_ok
            });
            if keys != 1 || !keeps_endpoints {
                return Err(SchemaError::missing_primary_key(&table.name));
            }
        }

        let remaining: HashSet<ColumnId> = next.iter().map(|c| c.id).collect();
        for display in self.display_columns.values_mut() {
            if display.source_table_id == table_id {
                display
                    .fields
                    .retain(|f| remaining.contains(&f.source_column_id));
            }
        }

        let table = self
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))?;
        table.columns = next;
        debug!(table = %table.name, columns = table.columns.len(), "updated columns");
        Ok(table.clone())
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Link two tables
    ///
    /// For one-to-one and one-to-many the target table receives a derived
    /// foreign key column named after the source table. A default display
    /// column previewing the source primary key is committed alongside.
    pub fn create_relationship(
        &mut self,
        from_table_id: TableId,
        to_table_id: TableId,
        relation_type: RelationType,
        options: RelationshipOptions,
    ) -> SchemaResult<RelationshipCreated> {
        let from_table = self.require_table(from_table_id)?;
        let to_table = self.require_table(to_table_id)?;
        let from_pk = from_table
            .primary_key()
            .ok_or_else(|| SchemaError::missing_primary_key(&from_table.name))?;
        let to_pk = to_table
            .primary_key()
            .ok_or_else(|| SchemaError::missing_primary_key(&to_table.name))?;

        let mut relationship = Relationship::new(
            from_table.id,
            from_pk.id,
            to_table.id,
            to_pk.id,
            relation_type,
        )
        .with_options(&options);
        relationship.display_column_id = Some(from_pk.id);
        relationship.display_column_name = Some(from_pk.name.clone());

        let mut target = to_table.clone();
        if relation_type.uses_foreign_key() {
            let fk_name = foreign_key_name(&from_table.name);
            if target.has_column_named(&fk_name) {
                return Err(SchemaError::duplicate_column(&target.name, fk_name));
            }
            relationship.to_column_id =
                add_foreign_key_to_table(&mut target, &relationship, from_table)?;
        }

        let display_column = display_column::synthesize(&relationship, from_table, &target)?;
        let from_name = from_table.name.clone();

        self.tables.insert(target.id, target.clone());
        self.index_relationship(&relationship);
        self.relationships
            .insert(relationship.id, relationship.clone());
        self.display_columns
            .insert(display_column.id, display_column.clone());

        info!(
            from = %from_name,
            to = %target.name,
            kind = relation_type.as_str(),
            "created relationship"
        );
        Ok(RelationshipCreated {
            relationship,
            display_column,
            target_table: target,
        })
    }

    /// Change the cardinality of a relationship in place
    ///
    /// Switching between one-to-one and one-to-many keeps the existing foreign
    /// key column as it is. Switching to or from many-to-many detaches or
    /// attaches the derived column.
    pub fn change_relationship_type(
        &mut self,
        relationship_id: RelationshipId,
        new_type: RelationType,
    ) -> SchemaResult<Relationship> {
        let relationship = self.require_relationship(relationship_id)?;
        let from_table = self.require_table(relationship.from_table_id)?;
        let to_table = self.require_table(relationship.to_table_id)?;
        let from_pk = from_table
            .primary_key()
            .ok_or_else(|| SchemaError::missing_primary_key(&from_table.name))?;
        let to_pk = to_table
            .primary_key()
            .ok_or_else(|| SchemaError::missing_primary_key(&to_table.name))?;

        let mut updated = relationship.clone();
        updated.relation_type = new_type;

        let target = match (relationship.uses_foreign_key(), new_type.uses_foreign_key()) {
            (false, true) => {
                let mut target = to_table.clone();
                let fk_name = foreign_key_name(&from_table.name);
                if target.has_column_named(&fk_name) {
                    return Err(SchemaError::duplicate_column(&target.name, fk_name));
                }
                updated.from_column_id = from_pk.id;
                updated.to_column_id = add_foreign_key_to_table(&mut target, &updated, from_table)?;
                Some(target)
            }
            (true, false) => {
                let mut target = to_table.clone();
                remove_foreign_key_column(&mut target, relationship);
                updated.to_column_id = to_pk.id;
                Some(target)
            }
            _ => None,
        };

        if let Some(target) = target {
            self.tables.insert(target.id, target);
        }
        self.relationships.insert(updated.id, updated.clone());

        debug!(relationship = %updated.id, kind = new_type.as_str(), "changed relationship type");
        Ok(updated)
    }

    /// Update name and referential actions
    pub fn update_relationship_details(
        &mut self,
        relationship_id: RelationshipId,
        name: Option<String>,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    ) -> SchemaResult<Relationship> {
        let relationship = self
            .relationships
            .get_mut(&relationship_id)
            .ok_or_else(|| SchemaError::RelationshipNotFound(relationship_id.to_string()))?;
        relationship.name = name;
        relationship.on_delete = on_delete;
        relationship.on_update = on_update;
        debug!(relationship = %relationship_id, "updated relationship details");
        Ok(relationship.clone())
    }

    /// Delete a relationship with its foreign key column and display columns
    pub fn delete_relationship(
        &mut self,
        relationship_id: RelationshipId,
    ) -> SchemaResult<RelationshipDeleted> {
        let deleted = self
            .detach_relationship(relationship_id)
            .ok_or_else(|| SchemaError::RelationshipNotFound(relationship_id.to_string()))?;
        info!(relationship = %relationship_id, "deleted relationship");
        Ok(deleted)
    }

    fn detach_relationship(&mut self, relationship_id: RelationshipId) -> Option<RelationshipDeleted> {
        let relationship = self.relationships.shift_remove(&relationship_id)?;
        self.unindex_relationship(&relationship);

        // an already missing column counts as cleaned up
        let removed_column = if relationship.uses_foreign_key() {
            self.tables
                .get_mut(&relationship.to_table_id)
                .and_then(|t| remove_foreign_key_column(t, &relationship))
        } else {
            None
        };

        let stale: Vec<DisplayColumnId> = self
            .display_columns
            .values()
            .filter(|c| c.relationship_id == relationship_id)
            .map(|c| c.id)
            .collect();
        let display_columns = stale
            .iter()
            .filter_map(|id| self.display_columns.shift_remove(id))
            .collect();

        Some(RelationshipDeleted {
            relationship,
            removed_column,
            display_columns,
        })
    }

    // ========================================================================
    // Display Columns
    // ========================================================================

    /// Store a display column (usually one synthesized by `resolve_display_column`)
    pub fn commit_display_column(&mut self, column: RelationshipDisplayColumn) -> SchemaResult<()> {
        let relationship = self.require_relationship(column.relationship_id)?;

        if self.display_columns.contains_key(&column.id)
            || self
                .display_column_for_relationship(column.relationship_id)
                .is_some()
        {
            return Err(SchemaError::DisplayColumnExists(
                column.relationship_id.to_string(),
            ));
        }
        if column.table_id != relationship.to_table_id {
            return Err(SchemaError::dangling("display column", column.table_id));
        }

        debug!(display_column = %column.id, relationship = %column.relationship_id, "committed display column");
        self.display_columns.insert(column.id, column);
        Ok(())
    }

    /// Replace the fields of a display column
    ///
    /// A column that was synthesized but never committed is committed here.
    pub fn update_display_column_fields(
        &mut self,
        display_column: RelationshipDisplayColumn,
        fields: Vec<RelationshipDisplayField>,
    ) -> SchemaResult<RelationshipDisplayColumn> {
        let stored = if self.display_columns.contains_key(&display_column.id) {
            Some(display_column.id)
        } else {
            self.display_column_for_relationship(display_column.relationship_id)
                .map(|c| c.id)
        };

        match stored {
            Some(id) => {
                let column = self
                    .display_columns
                    .get_mut(&id)
                    .ok_or_else(|| SchemaError::DisplayColumnNotFound(id.to_string()))?;
                column.fields = fields;
                debug!(display_column = %id, fields = column.fields.len(), "updated display fields");
                Ok(column.clone())
            }
            None => {
                let mut column = display_column;
                column.fields = fields;
                self.commit_display_column(column.clone())?;
                Ok(column)
            }
        }
    }

    pub fn set_display_column_visibility(
        &mut self,
        display_column_id: DisplayColumnId,
        visible: bool,
    ) -> SchemaResult<()> {
        let column = self
            .display_columns
            .get_mut(&display_column_id)
            .ok_or_else(|| SchemaError::DisplayColumnNotFound(display_column_id.to_string()))?;
        column.is_visible = visible;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
