//! # Schemaboard Core
//!
//! Core types, traits, and error handling for Schemaboard.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: identifiers, geometry primitives (Position, Size, Rect),
//!   relationship cardinality and referential actions
//! - **Traits**: common behaviors like `Validatable` and `Persistable`
//! - **Errors**: unified error handling with `SchemaError` and `SchemaResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{SchemaError, SchemaResult};
pub use traits::{Identifiable, Named, Persistable, Positioned, Validatable};
pub use types::{
    ColumnId, DisplayColumnId, Position, Rect, ReferentialAction, RelationType, RelationshipId,
    Size, TableId,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
