//! Error types for Schemaboard
//!
//! This module provides unified error handling across the workspace: command
//! rejections raised by the schema graph, locally recovered geometry and
//! reference problems, and persistence/configuration failures.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Schemaboard
#[derive(Debug, Error)]
pub enum SchemaError {
    // ========================================================================
    // Command Rejections
    // ========================================================================
    /// A relationship endpoint lacks a (single) primary key column
    #[error("Table '{table}' has no primary key; add one before linking it")]
    MissingPrimaryKey { table: String },

    /// The derived foreign key column name is already taken on the target table
    #[error("Column '{column}' already exists in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A table with the same id is already part of the graph
    #[error("Table already exists: {0}")]
    DuplicateTable(String),

    /// A display column is already stored for the relationship
    #[error("Relationship '{0}' already has a display column")]
    DisplayColumnExists(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Display column not found
    #[error("Display column not found: {0}")]
    DisplayColumnNotFound(String),

    // ========================================================================
    // Locally Recovered Errors
    // ========================================================================
    /// A relationship or display column points at something that no longer exists
    #[error("Dangling reference from {entity} to missing id {id}")]
    DanglingReference { entity: String, id: String },

    /// A computed anchor or path coordinate was not finite
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Graph invariants do not hold
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot could not be interpreted
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    /// Create a missing primary key error
    pub fn missing_primary_key(table: impl Into<String>) -> Self {
        SchemaError::MissingPrimaryKey {
            table: table.into(),
        }
    }

    /// Create a duplicate column error
    pub fn duplicate_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        SchemaError::DuplicateColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a dangling reference error
    pub fn dangling(entity: impl Into<String>, id: impl ToString) -> Self {
        SchemaError::DanglingReference {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        SchemaError::InvalidConfig(msg.into())
    }

    /// Check if this error rejected a command before any mutation
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SchemaError::MissingPrimaryKey { .. }
                | SchemaError::DuplicateColumn { .. }
                | SchemaError::DuplicateTable(_)
                | SchemaError::DisplayColumnExists(_)
        ) || self.is_not_found()
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchemaError::TableNotFound(_)
                | SchemaError::RelationshipNotFound(_)
                | SchemaError::DisplayColumnNotFound(_)
        )
    }

    /// Check if this error is handled where it arises instead of reaching the user
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SchemaError::DanglingReference { .. } | SchemaError::InvalidCoordinates(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            SchemaError::Io(_) | SchemaError::FileRead { .. } | SchemaError::FileWrite { .. }
        )
    }
}

/// Result type alias using SchemaError
pub type SchemaResult<T> = Result<T, SchemaError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_primary_key_names_table() {
        let err = SchemaError::missing_primary_key("order");
        assert!(err.is_rejection());
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Table 'order' has no primary key; add one before linking it"
        );
    }

    #[test]
    fn test_duplicate_column() {
        let err = SchemaError::duplicate_column("order", "user_id");
        assert!(err.is_rejection());
        assert_eq!(
            err.to_string(),
            "Column 'user_id' already exists in table 'order'"
        );
    }

    #[test]
    fn test_not_found_errors() {
        let err = SchemaError::TableNotFound("abc".to_string());
        assert!(err.is_not_found());
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "Table not found: abc");
    }

    #[test]
    fn test_recoverable_errors() {
        let err = SchemaError::dangling("relationship", "42");
        assert!(err.is_recoverable());
        assert!(!err.is_rejection());
        assert_eq!(
            err.to_string(),
            "Dangling reference from relationship to missing id 42"
        );

        let err = SchemaError::InvalidCoordinates("anchor x is NaN".to_string());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SchemaError = io_err.into();
        assert!(err.is_io());
        assert!(!err.is_rejection());
    }
}
