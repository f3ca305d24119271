//! Integrity checks for schema graphs
//!
//! Collects every violated graph invariant instead of stopping at the first
//! one. Used after loading persisted data and by the `check` command.

use crate::foreign_key::{foreign_key_name, orphaned_foreign_keys};
use crate::graph::SchemaGraph;
use schemaboard_core::{SchemaError, SchemaResult, Validatable};
use std::collections::HashMap;

// ============================================================================
// IntegrityReport
// ============================================================================

/// Result of an integrity check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// Create an empty report
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: IntegrityIssue) {
        self.issues.push(issue);
    }

    /// Check if no invariant is violated
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues with a given code
    pub fn issues_with(&self, code: IntegrityCode) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// Convert to SchemaResult (fails if any issue was found)
    pub fn to_result(&self) -> SchemaResult<()> {
        if self.is_clean() {
            return Ok(());
        }
        let msg = self
            .issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(SchemaError::Integrity(msg))
    }
}

// ============================================================================
// IntegrityIssue
// ============================================================================

/// A single violated invariant
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityIssue {
    pub code: IntegrityCode,
    pub message: String,
    /// Path to the offending element (e.g., "relationships.<id>")
    pub path: Option<String>,
}

impl IntegrityIssue {
    pub fn new(code: IntegrityCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path to the issue
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Integrity issue codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrityCode {
    /// Relationship endpoint table is missing
    DanglingRelationship,
    /// Relationship endpoint has no single primary key
    MissingPrimaryKey,
    /// Relationship source column is not the source primary key
    SourceNotPrimaryKey,
    /// No derived foreign key column on the target table
    MissingForeignKey,
    /// More than one derived foreign key column for the same reference
    DuplicateForeignKey,
    /// Foreign key column name does not follow `{source}_id`
    ForeignKeyName,
    /// Relationship target column does not exist
    MissingTargetColumn,
    /// Derived foreign key column that no relationship owns
    OrphanForeignKey,
    /// Display column points at a missing relationship
    DanglingDisplayColumn,
    /// More than one display column for a relationship
    DuplicateDisplayColumn,
    /// Display column is not attached to the relationship target table
    DisplayTableMismatch,
}

impl IntegrityCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityCode::DanglingRelationship => "dangling-relationship",
            IntegrityCode::MissingPrimaryKey => "missing-primary-key",
            IntegrityCode::SourceNotPrimaryKey => "source-not-primary-key",
            IntegrityCode::MissingForeignKey => "missing-foreign-key",
            IntegrityCode::DuplicateForeignKey => "duplicate-foreign-key",
            IntegrityCode::ForeignKeyName => "foreign-key-name",
            IntegrityCode::MissingTargetColumn => "missing-target-column",
            IntegrityCode::OrphanForeignKey => "orphan-foreign-key",
            IntegrityCode::DanglingDisplayColumn => "dangling-display-column",
            IntegrityCode::DuplicateDisplayColumn => "duplicate-display-column",
            IntegrityCode::DisplayTableMismatch => "display-table-mismatch",
        }
    }
}

impl std::fmt::Display for IntegrityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Check every graph invariant
pub fn check_integrity(graph: &SchemaGraph) -> IntegrityReport {
    let mut report = IntegrityReport::ok();
    check_relationships(graph, &mut report);
    check_foreign_key_owners(graph, &mut report);
    check_display_columns(graph, &mut report);
    report
}

fn check_relationships(graph: &SchemaGraph, report: &mut IntegrityReport) {
    for rel in graph.relationships() {
        let path = format!("relationships.{}", rel.id);

        let (Some(from), Some(to)) = (graph.table(rel.from_table_id), graph.table(rel.to_table_id))
        else {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::DanglingRelationship,
                    "Relationship references a missing table",
                )
                .with_path(path),
            );
            continue;
        };

        for table in [from, to] {
            if table.primary_key().is_none() {
                report.add_issue(
                    IntegrityIssue::new(
                        IntegrityCode::MissingPrimaryKey,
                        format!("Table '{}' does not have exactly one primary key", table.name),
                    )
                    .with_path(path.clone()),
                );
            }
        }

        if from.primary_key().map(|pk| pk.id) != Some(rel.from_column_id) {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::SourceNotPrimaryKey,
                    format!("Source column is not the primary key of '{}'", from.name),
                )
                .with_path(path.clone()),
            );
        }

        if to.get_column(rel.to_column_id).is_none() {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::MissingTargetColumn,
                    format!("Target column does not exist on '{}'", to.name),
                )
                .with_path(path.clone()),
            );
        }

        if !rel.uses_foreign_key() {
            continue;
        }

        let keys: Vec<_> = to
            .columns
            .iter()
            .filter(|c| c.references_column(from.id, rel.from_column_id))
            .collect();
        match keys.as_slice() {
            [] => report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::MissingForeignKey,
                    format!("Table '{}' has no foreign key to '{}'", to.name, from.name),
                )
                .with_path(path),
            ),
            [fk] => {
                let expected = foreign_key_name(&from.name);
                if fk.name != expected {
                    report.add_issue(
                        IntegrityIssue::new(
                            IntegrityCode::ForeignKeyName,
                            format!("Foreign key '{}' should be named '{}'", fk.name, expected),
                        )
                        .with_path(path),
                    );
                }
            }
            _ => report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::DuplicateForeignKey,
                    format!("Table '{}' has {} foreign keys to '{}'", to.name, keys.len(), from.name),
                )
                .with_path(path),
            ),
        }
    }
}

fn check_foreign_key_owners(graph: &SchemaGraph, report: &mut IntegrityReport) {
    for (table, column) in orphaned_foreign_keys(graph.tables(), graph.relationship_map().values()) {
        report.add_issue(
            IntegrityIssue::new(
                IntegrityCode::OrphanForeignKey,
                format!(
                    "Foreign key '{}' on '{}' belongs to no relationship",
                    column.name, table.name
                ),
            )
            .with_path(format!("tables.{}.columns.{}", table.id, column.id)),
        );
    }
}

fn check_display_columns(graph: &SchemaGraph, report: &mut IntegrityReport) {
    let mut per_relationship: HashMap<_, usize> = HashMap::new();

    for column in graph.display_columns() {
        let path = format!("relationshipDisplayColumns.{}", column.id);

        let Some(rel) = graph.relationship(column.relationship_id) else {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::DanglingDisplayColumn,
                    "Display column references a missing relationship",
                )
                .with_path(path),
            );
            continue;
        };

        *per_relationship.entry(rel.id).or_default() += 1;
        if per_relationship[&rel.id] == 2 {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::DuplicateDisplayColumn,
                    "Relationship has more than one display column",
                )
                .with_path(format!("relationships.{}", rel.id)),
            );
        }

        if column.table_id != rel.to_table_id {
            report.add_issue(
                IntegrityIssue::new(
                    IntegrityCode::DisplayTableMismatch,
                    "Display column is not attached to the relationship target",
                )
                .with_path(path),
            );
        }
    }
}

impl Validatable for SchemaGraph {
    fn validate(&self) -> SchemaResult<()> {
        check_integrity(self).to_result()
    }
}

// ============================================================================
// Tests
// ============================================================================
