//! # Schemaboard Graph
//!
//! The schema graph consistency engine.
//!
//! This crate contains:
//!
//! - **Table / TableColumn**: positioned table cards and their ordered columns
//! - **Relationship**: typed links between tables
//! - **Foreign keys**: derivation of the system-generated FK column a link implies
//! - **Display columns**: per-relationship previews of linked record fields
//! - **SchemaGraph**: owner of all collections, cascading every mutation
//! - **SchemaStore**: command protocol with a monotonic version counter
//! - **Snapshots**: JSON persistence with repair of dangling legacy data
//! - **Integrity**: invariant checks over a whole graph
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaboard_graph::prelude::*;
//!
//! let mut graph = SchemaGraph::new();
//! let user = Table::new("user");
//! let order = Table::new("order").at(400.0, 0.0);
//! let (user_id, order_id) = (user.id, order.id);
//! graph.add_table(user)?;
//! graph.add_table(order)?;
//!
//! let created = graph.create_relationship(
//!     user_id,
//!     order_id,
//!     RelationType::OneToOne,
//!     RelationshipOptions::auto_link(),
//! )?;
//! assert!(created.target_table.has_column_named("user_id"));
//! ```

pub mod column;
pub mod display_column;
pub mod foreign_key;
pub mod graph;
pub mod integrity;
pub mod relationship;
pub mod snapshot;
pub mod store;
pub mod table;

// Re-export main types at crate root
pub use column::TableColumn;
pub use display_column::{
    RelationshipDisplayColumn, RelationshipDisplayField, ResolvedDisplayColumn,
};
pub use graph::{RelationshipCreated, RelationshipDeleted, SchemaGraph, TableRemoved};
pub use integrity::{check_integrity, IntegrityCode, IntegrityIssue, IntegrityReport};
pub use relationship::{Relationship, RelationshipOptions};
pub use snapshot::{load_snapshot, save_snapshot, LoadRepair, LoadReport, SchemaSnapshot};
pub use store::{CommandOutcome, SchemaCommand, SchemaStore, StoreUpdate};
pub use table::Table;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::column::TableColumn;
    pub use crate::display_column::{RelationshipDisplayColumn, RelationshipDisplayField};
    pub use crate::graph::SchemaGraph;
    pub use crate::relationship::{Relationship, RelationshipOptions};
    pub use crate::snapshot::SchemaSnapshot;
    pub use crate::store::{SchemaCommand, SchemaStore};
    pub use crate::table::Table;
    pub use schemaboard_core::{
        Persistable, ReferentialAction, RelationType, SchemaError, SchemaResult, Validatable,
    };
}
