//! Snapshots for the persistence collaborator
//!
//! A `SchemaSnapshot` is the plain `{tables, relationships,
//! relationshipDisplayColumns}` JSON document handed out after every
//! mutation. Loading one repairs what legacy or corrupted data may contain:
//! dangling relationships and display columns are dropped along with the
//! foreign keys nothing owns any more, duplicate display columns are
//! collapsed and missing ones are synthesized.

use crate::display_column::{self, RelationshipDisplayColumn};
use crate::foreign_key::orphaned_foreign_keys;
use crate::graph::SchemaGraph;
use crate::relationship::Relationship;
use crate::table::Table;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemaboard_core::{
    ColumnId, DisplayColumnId, Persistable, RelationshipId, SchemaError, SchemaResult, TableId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// SchemaSnapshot
// ============================================================================

/// Serializable state of a schema graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default)]
    pub relationships: Vec<Relationship>,

    #[serde(default)]
    pub relationship_display_columns: Vec<RelationshipDisplayColumn>,

    /// When the snapshot was written to disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SchemaSnapshot {
    /// Copy of this snapshot stamped with the current time
    pub fn stamped(&self) -> Self {
        Self {
            saved_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Check if the snapshot holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Persistable for SchemaSnapshot {}

/// Load a snapshot from a file, mapping malformed JSON to `InvalidSnapshot`
pub fn load_snapshot(path: &Path) -> SchemaResult<SchemaSnapshot> {
    SchemaSnapshot::load_from_file(path).map_err(|e| match e {
        SchemaError::Json(inner) => {
            SchemaError::InvalidSnapshot(format!("{}: {}", path.display(), inner))
        }
        other => other,
    })
}

/// Save a snapshot to a file, stamping `savedAt`
pub fn save_snapshot(snapshot: &SchemaSnapshot, path: &Path) -> SchemaResult<()> {
    snapshot.stamped().save_to_file(path)
}

// ============================================================================
// Load Repairs
// ============================================================================

/// A repair applied while loading a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRepair {
    /// Table id appeared more than once; the first occurrence was kept
    DuplicateTable { table_id: TableId },
    /// Relationship id appeared more than once; the first occurrence was kept
    DuplicateRelationship { relationship_id: RelationshipId },
    /// Relationship pointed at a missing table or column
    DroppedRelationship {
        relationship_id: RelationshipId,
        missing: String,
    },
    /// Derived foreign key column left behind by a dropped relationship
    RemovedOrphanForeignKey {
        table_id: TableId,
        column_id: ColumnId,
        column: String,
    },
    /// Display column pointed at a missing relationship
    DroppedDisplayColumn {
        display_column_id: DisplayColumnId,
        relationship_id: RelationshipId,
    },
    /// Second display column for the same relationship
    DuplicateDisplayColumn {
        display_column_id: DisplayColumnId,
        relationship_id: RelationshipId,
    },
    /// Display column was attached to the wrong table
    RepointedDisplayColumn {
        display_column_id: DisplayColumnId,
        table_id: TableId,
    },
    /// Display fields whose source column no longer exists
    PrunedDisplayFields {
        display_column_id: DisplayColumnId,
        count: usize,
    },
    /// Display column synthesized for a relationship that had none
    CreatedDisplayColumn {
        display_column_id: DisplayColumnId,
        relationship_id: RelationshipId,
    },
}

impl std::fmt::Display for LoadRepair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadRepair::DuplicateTable { table_id } => {
                write!(f, "dropped duplicate table {}", table_id)
            }
            LoadRepair::DuplicateRelationship { relationship_id } => {
                write!(f, "dropped duplicate relationship {}", relationship_id)
            }
            LoadRepair::RemovedOrphanForeignKey {
                table_id,
                column,
                ..
            } => write!(
                f,
                "removed orphaned foreign key {} from table {}",
                column, table_id
            ),
            LoadRepair::DroppedRelationship {
                relationship_id,
                missing,
            } => write!(
                f,
                "dropped relationship {} (missing {})",
                relationship_id, missing
            ),
            LoadRepair::DroppedDisplayColumn {
                display_column_id,
                relationship_id,
            } => write!(
                f,
                "dropped display column {} (missing relationship {})",
                display_column_id, relationship_id
            ),
            LoadRepair::DuplicateDisplayColumn {
                display_column_id,
                relationship_id,
            } => write!(
                f,
                "dropped display column {} (relationship {} already has one)",
                display_column_id, relationship_id
            ),
            LoadRepair::RepointedDisplayColumn {
                display_column_id,
                table_id,
            } => write!(
                f,
                "moved display column {} to table {}",
                display_column_id, table_id
            ),
            LoadRepair::PrunedDisplayFields {
                display_column_id,
                count,
            } => write!(
                f,
                "pruned {} field(s) from display column {}",
                count, display_column_id
            ),
            LoadRepair::CreatedDisplayColumn {
                display_column_id,
                relationship_id,
            } => write!(
                f,
                "created display column {} for relationship {}",
                display_column_id, relationship_id
            ),
        }
    }
}

/// Every repair applied while loading a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub repairs: Vec<LoadRepair>,
}

impl LoadReport {
    /// Check if the snapshot loaded without repairs
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repairs.is_empty()
    }

    fn record(&mut self, repair: LoadRepair) {
        warn!("snapshot repair: {}", repair);
        self.repairs.push(repair);
    }
}

// ============================================================================
// Graph Conversion
// ============================================================================

impl SchemaGraph {
    /// Build a graph from a snapshot, repairing dangling data
    pub fn from_snapshot(snapshot: SchemaSnapshot) -> (SchemaGraph, LoadReport) {
        let mut report = LoadReport::default();
        let mut graph = SchemaGraph::new();

        for table in snapshot.tables {
            if graph.tables.contains_key(&table.id) {
                report.record(LoadRepair::DuplicateTable { table_id: table.id });
                continue;
            }
            graph.tables.insert(table.id, table);
        }

        for relationship in snapshot.relationships {
            if graph.relationships.contains_key(&relationship.id) {
                report.record(LoadRepair::DuplicateRelationship {
                    relationship_id: relationship.id,
                });
                continue;
            }
            if let Some(missing) = missing_endpoint(&graph.tables, &relationship) {
                report.record(LoadRepair::DroppedRelationship {
                    relationship_id: relationship.id,
                    missing,
                });
                continue;
            }
            graph.relationships.insert(relationship.id, relationship);
        }
        graph.rebuild_index();

        let orphans: Vec<(TableId, ColumnId, String)> =
            orphaned_foreign_keys(graph.tables.values(), graph.relationships.values())
                .into_iter()
                .map(|(table, column)| (table.id, column.id, column.name.clone()))
                .collect();
        for (table_id, column_id, column) in orphans {
            if let Some(table) = graph.tables.get_mut(&table_id) {
                table.columns.retain(|c| c.id != column_id);
            }
            report.record(LoadRepair::RemovedOrphanForeignKey {
                table_id,
                column_id,
                column,
            });
        }

        for mut column in snapshot.relationship_display_columns {
            let Some(relationship) = graph.relationships.get(&column.relationship_id) else {
                report.record(LoadRepair::DroppedDisplayColumn {
                    display_column_id: column.id,
                    relationship_id: column.relationship_id,
                });
                continue;
            };
            if graph
                .display_columns
                .values()
                .any(|c| c.relationship_id == relationship.id)
            {
                report.record(LoadRepair::DuplicateDisplayColumn {
                    display_column_id: column.id,
                    relationship_id: relationship.id,
                });
                continue;
            }

            if column.table_id != relationship.to_table_id {
                column.table_id = relationship.to_table_id;
                report.record(LoadRepair::RepointedDisplayColumn {
                    display_column_id: column.id,
                    table_id: column.table_id,
                });
            }
            column.source_table_id = relationship.from_table_id;

            if let Some(source) = graph.tables.get(&column.source_table_id) {
                let before = column.fields.len();
                column
                    .fields
                    .retain(|f| source.get_column(f.source_column_id).is_some());
                if column.fields.len() < before {
                    report.record(LoadRepair::PrunedDisplayFields {
                        display_column_id: column.id,
                        count: before - column.fields.len(),
                    });
                }
            }

            graph.display_columns.insert(column.id, column);
        }

        let created = display_column::create_missing_for_relationships(
            graph.relationships.values(),
            &graph.display_columns,
            &graph.tables,
        );
        for column in created {
            report.record(LoadRepair::CreatedDisplayColumn {
                display_column_id: column.id,
                relationship_id: column.relationship_id,
            });
            graph.display_columns.insert(column.id, column);
        }

        info!(
            tables = graph.tables.len(),
            relationships = graph.relationships.len(),
            display_columns = graph.display_columns.len(),
            repairs = report.len(),
            "loaded schema snapshot"
        );
        (graph, report)
    }

    /// Snapshot of the current state, in insertion order
    pub fn to_snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            tables: self.tables.values().cloned().collect(),
            relationships: self.relationships.values().cloned().collect(),
            relationship_display_columns: self.display_columns.values().cloned().collect(),
            saved_at: None,
        }
    }
}

fn missing_endpoint(tables: &IndexMap<TableId, Table>, rel: &Relationship) -> Option<String> {
    let Some(from) = tables.get(&rel.from_table_id) else {
        return Some(format!("table {}", rel.from_table_id));
    };
    let Some(to) = tables.get(&rel.to_table_id) else {
        return Some(format!("table {}", rel.to_table_id));
    };
    if from.get_column(rel.from_column_id).is_none() {
        return Some(format!("column {}", rel.from_column_id));
    }
    if to.get_column(rel.to_column_id).is_none() {
        return Some(format!("column {}", rel.to_column_id));
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
