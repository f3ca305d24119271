//! Relationship display columns
//!
//! A display column describes which fields of a linked record are previewed on
//! the target table's card. There is at most one per relationship. Resolution
//! is pure: a missing column is synthesized from the source primary key and
//! handed back to the caller, who decides whether to commit it.

use crate::relationship::Relationship;
use crate::table::Table;
use indexmap::IndexMap;
use schemaboard_core::{
    ColumnId, DisplayColumnId, Identifiable, RelationshipId, SchemaError, SchemaResult, TableId,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// Types
// ============================================================================

/// One previewed field of a linked record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDisplayField {
    /// Column on the source table the value comes from
    pub source_column_id: ColumnId,
    /// Label shown on the target card
    pub display_name: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

impl RelationshipDisplayField {
    pub fn new(source_column_id: ColumnId, display_name: impl Into<String>) -> Self {
        Self {
            source_column_id,
            display_name: display_name.into(),
            is_visible: true,
        }
    }

    /// Set visibility
    pub fn visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }
}

/// Preview configuration for a relationship, shown on the target table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDisplayColumn {
    pub id: DisplayColumnId,
    pub relationship_id: RelationshipId,
    /// Always the relationship's target table
    pub table_id: TableId,
    pub source_table_id: TableId,
    #[serde(default)]
    pub fields: Vec<RelationshipDisplayField>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl RelationshipDisplayColumn {
    /// Fields currently shown on the card
    pub fn visible_fields(&self) -> impl Iterator<Item = &RelationshipDisplayField> {
        self.fields.iter().filter(|f| f.is_visible)
    }
}

impl Identifiable for RelationshipDisplayColumn {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Result of resolving the display column of a relationship
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDisplayColumn {
    /// Already stored in the graph
    Existing(RelationshipDisplayColumn),
    /// Freshly synthesized, not stored anywhere yet
    Synthesized(RelationshipDisplayColumn),
}

impl ResolvedDisplayColumn {
    pub fn column(&self) -> &RelationshipDisplayColumn {
        match self {
            ResolvedDisplayColumn::Existing(c) | ResolvedDisplayColumn::Synthesized(c) => c,
        }
    }

    pub fn into_inner(self) -> RelationshipDisplayColumn {
        match self {
            ResolvedDisplayColumn::Existing(c) | ResolvedDisplayColumn::Synthesized(c) => c,
        }
    }

    /// Whether the caller still has to commit the column
    pub fn is_synthesized(&self) -> bool {
        matches!(self, ResolvedDisplayColumn::Synthesized(_))
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Build the default display column of a relationship
///
/// The source primary key is the sole field, labelled `{source}_{pk}`.
pub fn synthesize(
    relationship: &Relationship,
    from_table: &Table,
    to_table: &Table,
) -> SchemaResult<RelationshipDisplayColumn> {
    let pk = from_table
        .primary_key()
        .ok_or_else(|| SchemaError::missing_primary_key(&from_table.name))?;

    Ok(RelationshipDisplayColumn {
        id: Uuid::new_v4(),
        relationship_id: relationship.id,
        table_id: to_table.id,
        source_table_id: from_table.id,
        fields: vec![RelationshipDisplayField::new(
            pk.id,
            format!("{}_{}", from_table.name, pk.name),
        )],
        is_visible: true,
    })
}

/// Return the stored display column of a relationship, or synthesize one
///
/// Never mutates the passed collections.
pub fn get_or_create(
    relationship_id: RelationshipId,
    relationships: &IndexMap<RelationshipId, Relationship>,
    tables: &IndexMap<TableId, Table>,
    existing: &IndexMap<DisplayColumnId, RelationshipDisplayColumn>,
) -> SchemaResult<ResolvedDisplayColumn> {
    if let Some(column) = existing
        .values()
        .find(|c| c.relationship_id == relationship_id)
    {
        return Ok(ResolvedDisplayColumn::Existing(column.clone()));
    }

    let relationship = relationships
        .get(&relationship_id)
        .ok_or_else(|| SchemaError::RelationshipNotFound(relationship_id.to_string()))?;
    let from_table = tables
        .get(&relationship.from_table_id)
        .ok_or_else(|| SchemaError::dangling("relationship", relationship.from_table_id))?;
    let to_table = tables
        .get(&relationship.to_table_id)
        .ok_or_else(|| SchemaError::dangling("relationship", relationship.to_table_id))?;

    synthesize(relationship, from_table, to_table).map(ResolvedDisplayColumn::Synthesized)
}

/// Synthesize display columns for every relationship that has none
///
/// Used once after loading a schema that may predate display columns.
/// Relationships that cannot be resolved are skipped.
pub fn create_missing_for_relationships<'a>(
    relationships: impl IntoIterator<Item = &'a Relationship>,
    existing: &IndexMap<DisplayColumnId, RelationshipDisplayColumn>,
    tables: &IndexMap<TableId, Table>,
) -> Vec<RelationshipDisplayColumn> {
    let mut created = Vec::new();

    for relationship in relationships {
        if existing
            .values()
            .any(|c| c.relationship_id == relationship.id)
        {
            continue;
        }

        let resolved = match (
            tables.get(&relationship.from_table_id),
            tables.get(&relationship.to_table_id),
        ) {
            (Some(from), Some(to)) => synthesize(relationship, from, to),
            _ => Err(SchemaError::dangling("relationship", relationship.id)),
        };

        match resolved {
            Ok(column) => created.push(column),
            Err(e) => warn!(relationship = %relationship.id, "skipping display column: {}", e),
        }
    }

    created
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use schemaboard_core::RelationType;

    struct Fixture {
        tables: IndexMap<TableId, Table>,
        relationships: IndexMap<RelationshipId, Relationship>,
        user: Table,
        order: Table,
        rel: Relationship,
    }

    fn fixture() -> Fixture {
        let user = Table::new("user");
        let order = Table::new("order");
        let rel = Relationship::new(
            user.id,
            user.columns[0].id,
            order.id,
            order.columns[0].id,
            RelationType::OneToMany,
        );

        let mut tables = IndexMap::new();
        tables.insert(user.id, user.clone());
        tables.insert(order.id, order.clone());
        let mut relationships = IndexMap::new();
        relationships.insert(rel.id, rel.clone());

        Fixture {
            tables,
            relationships,
            user,
            order,
            rel,
        }
    }

    #[test]
    fn test_synthesizes_from_source_primary_key() {
        let f = fixture();
        let resolved =
            get_or_create(f.rel.id, &f.relationships, &f.tables, &IndexMap::new()).unwrap();

        assert!(resolved.is_synthesized());
        let column = resolved.column();
        assert_eq!(column.relationship_id, f.rel.id);
        assert_eq!(column.table_id, f.order.id);
        assert_eq!(column.source_table_id, f.user.id);
        assert!(column.is_visible);
        assert_eq!(column.fields.len(), 1);
        assert_eq!(column.fields[0].source_column_id, f.user.columns[0].id);
        assert_eq!(column.fields[0].display_name, "user_id");
        assert!(column.fields[0].is_visible);
    }

    #[test]
    fn test_returns_existing_column() {
        let f = fixture();
        let mut stored = synthesize(&f.rel, &f.user, &f.order).unwrap();
        stored.is_visible = false;
        let mut existing = IndexMap::new();
        existing.insert(stored.id, stored.clone());

        let resolved = get_or_create(f.rel.id, &f.relationships, &f.tables, &existing).unwrap();
        assert_eq!(resolved, ResolvedDisplayColumn::Existing(stored));
    }

    #[test]
    fn test_unknown_relationship() {
        let f = fixture();
        let err = get_or_create(Uuid::new_v4(), &f.relationships, &f.tables, &IndexMap::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_table_is_dangling() {
        let mut f = fixture();
        f.tables.shift_remove(&f.user.id);
        let err =
            get_or_create(f.rel.id, &f.relationships, &f.tables, &IndexMap::new()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_create_missing_skips_covered_and_dangling() {
        let f = fixture();
        let covered = synthesize(&f.rel, &f.user, &f.order).unwrap();
        let mut existing = IndexMap::new();
        existing.insert(covered.id, covered);

        let orphan = Relationship::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            f.order.id,
            f.order.columns[0].id,
            RelationType::OneToOne,
        );
        let second = Relationship::new(
            f.order.id,
            f.order.columns[0].id,
            f.user.id,
            f.user.columns[0].id,
            RelationType::OneToMany,
        );

        let all = [f.rel.clone(), orphan, second.clone()];
        let created = create_missing_for_relationships(all.iter(), &existing, &f.tables);

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].relationship_id, second.id);
        assert_eq!(created[0].table_id, f.user.id);
    }
}
