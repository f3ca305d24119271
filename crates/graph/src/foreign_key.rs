//! Foreign key synchronization
//!
//! Derives, attaches and removes the foreign key column implied by a
//! one-to-one or one-to-many relationship. The column always lives on the
//! target table and references the source table's primary key.

use crate::column::TableColumn;
use crate::relationship::Relationship;
use crate::table::Table;
use schemaboard_core::{ColumnId, RelationType, SchemaError, SchemaResult, TableId};
use tracing::debug;

// ============================================================================
// Naming
// ============================================================================

/// Name of the foreign key column referencing a source table
///
/// # Examples
///
/// - "user" -> "user_id"
/// - "Customer" -> "customer_id"
pub fn foreign_key_name(source_table_name: &str) -> String {
    format!("{}_id", source_table_name.to_lowercase())
}

// ============================================================================
// Column Creation
// ============================================================================

/// Build the foreign key column a relationship implies on its target table
///
/// The type mirrors the source primary key. One-to-one columns are nullable
/// and unique; every other type is nullable and not unique.
pub fn create_foreign_key_column(
    relationship: &Relationship,
    from_table: &Table,
    to_table: &Table,
) -> SchemaResult<TableColumn> {
    let pk = from_table
        .primary_key()
        .ok_or_else(|| SchemaError::missing_primary_key(&from_table.name))?;

    let unique = matches!(relationship.relation_type, RelationType::OneToOne);
    let column = TableColumn::new(foreign_key_name(&from_table.name), pk.data_type.clone())
        .nullable(true)
        .unique(unique)
        .references(from_table.id, pk.id)
        .system_generated();

    debug!(
        column = %column.name,
        table = %to_table.name,
        "derived foreign key column"
    );
    Ok(column)
}

/// Attach the foreign key column for a relationship to its target table
///
/// Idempotent: when a column with the expected name already references
/// `referenced_table`, its id is returned and the table is left untouched.
pub fn add_foreign_key_to_table(
    table: &mut Table,
    relationship: &Relationship,
    referenced_table: &Table,
) -> SchemaResult<ColumnId> {
    let name = foreign_key_name(&referenced_table.name);

    if let Some(existing) = table.columns.iter().find(|c| {
        c.is_foreign_key && c.referenced_table_id == Some(referenced_table.id) && c.name == name
    }) {
        return Ok(existing.id);
    }

    if table.has_column_named(&name) {
        return Err(SchemaError::duplicate_column(&table.name, name));
    }

    let column = create_foreign_key_column(relationship, referenced_table, table)?;
    let id = column.id;
    table.columns.push(column);
    Ok(id)
}

// ============================================================================
// Lookup and Removal
// ============================================================================

/// Find the foreign key column a relationship owns on `table`
pub fn find_foreign_key_column<'a>(
    table: &'a Table,
    relationship: &Relationship,
) -> Option<&'a TableColumn> {
    table
        .columns
        .iter()
        .find(|c| c.references_column(relationship.from_table_id, relationship.from_column_id))
}

/// Remove the foreign key column a relationship owns on `table`
///
/// Returns the removed column, or `None` when it was already gone.
pub fn remove_foreign_key_column(
    table: &mut Table,
    relationship: &Relationship,
) -> Option<TableColumn> {
    let index = table
        .columns
        .iter()
        .position(|c| c.references_column(relationship.from_table_id, relationship.from_column_id))?;
    Some(table.columns.remove(index))
}

/// Whether a derived column on `table_id` belongs to one of `relationships`
pub fn is_owned_foreign_key<'a>(
    table_id: TableId,
    column: &TableColumn,
    mut relationships: impl Iterator<Item = &'a Relationship>,
) -> bool {
    relationships.any(|r| {
        r.to_table_id == table_id
            && r.uses_foreign_key()
            && (r.to_column_id == column.id
                || column.references_column(r.from_table_id, r.from_column_id))
    })
}

/// Derived foreign key columns that no relationship owns
pub fn orphaned_foreign_keys<'a, R>(
    tables: impl IntoIterator<Item = &'a Table>,
    relationships: R,
) -> Vec<(&'a Table, &'a TableColumn)>
where
    R: Iterator<Item = &'a Relationship> + Clone,
{
    let mut orphans = Vec::new();
    for table in tables {
        for column in &table.columns {
            if column.is_system_generated
                && column.is_foreign_key
                && !is_owned_foreign_key(table.id, column, relationships.clone())
            {
                orphans.push((table, column));
            }
        }
    }
    orphans
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user_and_order(relation_type: RelationType) -> (Table, Table, Relationship) {
        let user = Table::new("User");
        let order = Table::new("order");
        let rel = Relationship::new(
            user.id,
            user.primary_key().unwrap().id,
            order.id,
            order.primary_key().unwrap().id,
            relation_type,
        );
        (user, order, rel)
    }

    #[test]
    fn test_foreign_key_name() {
        assert_eq!(foreign_key_name("user"), "user_id");
        assert_eq!(foreign_key_name("Customer"), "customer_id");
        assert_eq!(foreign_key_name("BlogPost"), "blogpost_id");
    }

    #[test]
    fn test_one_to_one_column_is_unique() {
        let (user, order, rel) = user_and_order(RelationType::OneToOne);
        let column = create_foreign_key_column(&rel, &user, &order).unwrap();

        assert_eq!(column.name, "user_id");
        assert_eq!(column.data_type, "UUID");
        assert!(column.is_foreign_key);
        assert!(column.is_nullable);
        assert!(column.is_unique);
        assert!(column.is_system_generated);
        assert!(!column.is_primary_key);
        assert_eq!(column.referenced_table_id, Some(user.id));
        assert_eq!(column.referenced_column_id, Some(user.primary_key().unwrap().id));
    }

    #[test]
    fn test_one_to_many_column_is_not_unique() {
        let (user, order, rel) = user_and_order(RelationType::OneToMany);
        let column = create_foreign_key_column(&rel, &user, &order).unwrap();
        assert!(column.is_nullable);
        assert!(!column.is_unique);
    }

    #[test]
    fn test_type_mirrors_source_primary_key() {
        let user = Table::empty("user").with_column(TableColumn::primary_key("id", "BIGINT"));
        let order = Table::new("order");
        let rel = Relationship::new(
            user.id,
            user.columns[0].id,
            order.id,
            order.columns[0].id,
            RelationType::OneToMany,
        );
        let column = create_foreign_key_column(&rel, &user, &order).unwrap();
        assert_eq!(column.data_type, "BIGINT");
    }

    #[test]
    fn test_source_without_primary_key_fails() {
        let user = Table::empty("user");
        let order = Table::new("order");
        let rel = Relationship::new(
            user.id,
            uuid::Uuid::new_v4(),
            order.id,
            order.columns[0].id,
            RelationType::OneToMany,
        );
        let err = create_foreign_key_column(&rel, &user, &order).unwrap_err();
        assert!(matches!(err, SchemaError::MissingPrimaryKey { ref table } if table == "user"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let (user, mut order, rel) = user_and_order(RelationType::OneToMany);

        let first = add_foreign_key_to_table(&mut order, &rel, &user).unwrap();
        let second = add_foreign_key_to_table(&mut order, &rel, &user).unwrap();

        assert_eq!(first, second);
        assert_eq!(order.columns.len(), 2);
    }

    #[test]
    fn test_add_rejects_name_taken_by_user_column() {
        let (user, order, rel) = user_and_order(RelationType::OneToMany);
        let mut order = order.with_column(TableColumn::new("user_id", "TEXT"));

        let err = add_foreign_key_to_table(&mut order, &rel, &user).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
        assert_eq!(order.columns.len(), 2);
    }

    #[test]
    fn test_find_and_remove() {
        let (user, mut order, rel) = user_and_order(RelationType::OneToOne);
        let fk_id = add_foreign_key_to_table(&mut order, &rel, &user).unwrap();

        assert_eq!(find_foreign_key_column(&order, &rel).map(|c| c.id), Some(fk_id));

        let removed = remove_foreign_key_column(&mut order, &rel).unwrap();
        assert_eq!(removed.id, fk_id);
        assert!(find_foreign_key_column(&order, &rel).is_none());
        assert!(remove_foreign_key_column(&mut order, &rel).is_none());
    }

    #[test]
    fn test_orphaned_foreign_keys() {
        let (user, mut order, rel) = user_and_order(RelationType::OneToMany);
        let fk_id = add_foreign_key_to_table(&mut order, &rel, &user).unwrap();
        let tables = [user.clone(), order.clone()];

        assert!(orphaned_foreign_keys(&tables, [&rel].into_iter()).is_empty());

        let orphans = orphaned_foreign_keys(&tables, std::iter::empty());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].0.id, order.id);
        assert_eq!(orphans[0].1.id, fk_id);

        let mut m2m = rel.clone();
        m2m.relation_type = RelationType::ManyToMany;
        assert_eq!(orphaned_foreign_keys(&tables, [&m2m].into_iter()).len(), 1);
    }
}
