//! Command protocol over the schema graph
//!
//! The dialog layer sends validated intents as `SchemaCommand`s. The store
//! applies them to its `SchemaGraph`, bumps a monotonic version on success and
//! returns the post-mutation snapshot. The render layer diffs on `version()`.

use crate::column::TableColumn;
use crate::display_column::{RelationshipDisplayColumn, RelationshipDisplayField, ResolvedDisplayColumn};
use crate::graph::{RelationshipCreated, RelationshipDeleted, SchemaGraph, TableRemoved};
use crate::relationship::{Relationship, RelationshipOptions};
use crate::snapshot::{LoadReport, SchemaSnapshot};
use crate::table::Table;
use schemaboard_core::{
    DisplayColumnId, ReferentialAction, RelationType, RelationshipId, SchemaError, SchemaResult,
    TableId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// Commands
// ============================================================================

/// A validated user intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SchemaCommand {
    AddTable {
        table: Table,
    },
    RemoveTable {
        table_id: TableId,
    },
    MoveTable {
        table_id: TableId,
        x: f64,
        y: f64,
    },
    ResizeTable {
        table_id: TableId,
        width: f64,
        height: f64,
    },
    RenameTable {
        table_id: TableId,
        name: String,
    },
    UpdateTableColumns {
        table_id: TableId,
        columns: Vec<TableColumn>,
    },
    CreateRelationship {
        from_table_id: TableId,
        to_table_id: TableId,
        #[serde(rename = "type")]
        relation_type: RelationType,
        #[serde(default)]
        options: RelationshipOptions,
    },
    ChangeRelationshipType {
        relationship_id: RelationshipId,
        #[serde(rename = "type")]
        relation_type: RelationType,
    },
    UpdateRelationshipDetails {
        relationship_id: RelationshipId,
        name: Option<String>,
        on_delete: ReferentialAction,
        on_update: ReferentialAction,
    },
    DeleteRelationship {
        relationship_id: RelationshipId,
    },
    CommitDisplayColumn {
        display_column: RelationshipDisplayColumn,
    },
    UpdateDisplayColumnFields {
        display_column: RelationshipDisplayColumn,
        fields: Vec<RelationshipDisplayField>,
    },
    SetDisplayColumnVisibility {
        display_column_id: DisplayColumnId,
        visible: bool,
    },
}

impl SchemaCommand {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            SchemaCommand::AddTable { .. } => "addTable",
            SchemaCommand::RemoveTable { .. } => "removeTable",
            SchemaCommand::MoveTable { .. } => "moveTable",
            SchemaCommand::ResizeTable { .. } => "resizeTable",
            SchemaCommand::RenameTable { .. } => "renameTable",
            SchemaCommand::UpdateTableColumns { .. } => "updateTableColumns",
            SchemaCommand::CreateRelationship { .. } => "createRelationship",
            SchemaCommand::ChangeRelationshipType { .. } => "changeRelationshipType",
            SchemaCommand::UpdateRelationshipDetails { .. } => "updateRelationshipDetails",
            SchemaCommand::DeleteRelationship { .. } => "deleteRelationship",
            SchemaCommand::CommitDisplayColumn { .. } => "commitDisplayColumn",
            SchemaCommand::UpdateDisplayColumnFields { .. } => "updateDisplayColumnFields",
            SchemaCommand::SetDisplayColumnVisibility { .. } => "setDisplayColumnVisibility",
        }
    }
}

/// Typed result of an applied command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    TableAdded(Table),
    TableRemoved(TableRemoved),
    TableUpdated(Table),
    RelationshipCreated(RelationshipCreated),
    RelationshipUpdated(Relationship),
    RelationshipDeleted(RelationshipDeleted),
    DisplayColumnUpdated(RelationshipDisplayColumn),
}

/// What the render and persistence layers receive after a command
#[derive(Debug, Clone, PartialEq)]
pub struct StoreUpdate {
    pub version: u64,
    pub outcome: CommandOutcome,
    pub snapshot: SchemaSnapshot,
}

// ============================================================================
// SchemaStore
// ============================================================================

/// Owner of the schema graph and its version counter
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    graph: SchemaGraph,
    version: u64,
}

impl SchemaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a persisted snapshot
    pub fn load(snapshot: SchemaSnapshot) -> (Self, LoadReport) {
        let (graph, report) = SchemaGraph::from_snapshot(snapshot);
        (Self { graph, version: 0 }, report)
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Number of successfully applied commands
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> SchemaSnapshot {
        self.graph.to_snapshot()
    }

    /// Stored or synthesized display column of a relationship (never mutates)
    pub fn resolve_display_column(
        &self,
        relationship_id: RelationshipId,
    ) -> SchemaResult<ResolvedDisplayColumn> {
        self.graph.resolve_display_column(relationship_id)
    }

    /// Apply a command
    ///
    /// A rejected command leaves the graph and the version untouched.
    pub fn apply(&mut self, command: SchemaCommand) -> SchemaResult<StoreUpdate> {
        let name = command.name();
        let outcome = match self.execute(command) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(command = name, "command rejected: {}", e);
                return Err(e);
            }
        };

        self.version += 1;
        debug!(command = name, version = self.version, "command applied");
        Ok(StoreUpdate {
            version: self.version,
            outcome,
            snapshot: self.graph.to_snapshot(),
        })
    }

    fn execute(&mut self, command: SchemaCommand) -> SchemaResult<CommandOutcome> {
        let graph = &mut self.graph;
        let outcome = match command {
            SchemaCommand::AddTable { table } => {
                graph.add_table(table.clone())?;
                CommandOutcome::TableAdded(table)
            }
            SchemaCommand::RemoveTable { table_id } => {
                CommandOutcome::TableRemoved(graph.remove_table(table_id)?)
            }
            SchemaCommand::MoveTable { table_id, x, y } => {
                graph.move_table(table_id, x, y)?;
                CommandOutcome::TableUpdated(table_snapshot(graph, table_id)?)
            }
            SchemaCommand::ResizeTable {
                table_id,
                width,
                height,
            } => {
                graph.resize_table(table_id, width, height)?;
                CommandOutcome::TableUpdated(table_snapshot(graph, table_id)?)
            }
            SchemaCommand::RenameTable { table_id, name } => {
                CommandOutcome::TableUpdated(graph.rename_table(table_id, name)?)
            }
            SchemaCommand::UpdateTableColumns { table_id, columns } => {
                CommandOutcome::TableUpdated(graph.update_table_columns(table_id, columns)?)
            }
            SchemaCommand::CreateRelationship {
                from_table_id,
                to_table_id,
                relation_type,
                options,
            } => CommandOutcome::RelationshipCreated(graph.create_relationship(
                from_table_id,
                to_table_id,
                relation_type,
                options,
            )?),
            SchemaCommand::ChangeRelationshipType {
                relationship_id,
                relation_type,
            } => CommandOutcome::RelationshipUpdated(
                graph.change_relationship_type(relationship_id, relation_type)?,
            ),
            SchemaCommand::UpdateRelationshipDetails {
                relationship_id,
                name,
                on_delete,
                on_update,
            } => CommandOutcome::RelationshipUpdated(graph.update_relationship_details(
                relationship_id,
                name,
                on_delete,
                on_update,
            )?),
            SchemaCommand::DeleteRelationship { relationship_id } => {
                CommandOutcome::RelationshipDeleted(graph.delete_relationship(relationship_id)?)
            }
            SchemaCommand::CommitDisplayColumn { display_column } => {
                graph.commit_display_column(display_column.clone())?;
                CommandOutcome::DisplayColumnUpdated(display_column)
            }
            SchemaCommand::UpdateDisplayColumnFields {
                display_column,
                fields,
            } => CommandOutcome::DisplayColumnUpdated(
                graph.update_display_column_fields(display_column, fields)?,
            ),
            SchemaCommand::SetDisplayColumnVisibility {
                display_column_id,
                visible,
            } => {
                graph.set_display_column_visibility(display_column_id, visible)?;
                let column = graph.display_column(display_column_id).cloned().ok_or_else(|| {
                    SchemaError::DisplayColumnNotFound(display_column_id.to_string())
                })?;
                CommandOutcome::DisplayColumnUpdated(column)
            }
        };
        Ok(outcome)
    }
}

fn table_snapshot(graph: &SchemaGraph, table_id: TableId) -> SchemaResult<Table> {
    graph
        .table(table_id)
        .cloned()
        .ok_or_else(|| SchemaError::TableNotFound(table_id.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
