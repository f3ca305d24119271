//! Core traits for Schemaboard
//!
//! Shared behaviors implemented by the schema model: self-validation,
//! JSON persistence, identity, naming and canvas positioning.

use crate::error::{SchemaError, SchemaResult};
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can check their own consistency
///
/// # Example
///
/// ```rust,ignore
/// use schemaboard_core::{SchemaError, SchemaResult, Validatable};
///
/// struct Column {
///     name: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> SchemaResult<()> {
///         if self.name.is_empty() {
///             return Err(SchemaError::Integrity("Column name is empty".into()));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    fn validate(&self) -> SchemaResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for values handed to the persistence collaborator as UTF-8 JSON
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str {
        "json"
    }

    /// Save to a pretty JSON string
    fn to_json(&self) -> SchemaResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Save to a compact JSON string
    fn to_compact_json(&self) -> SchemaResult<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> SchemaResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> SchemaResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| SchemaError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> SchemaResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SchemaError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a UUID-based identifier
pub trait Identifiable {
    /// Get the unique identifier
    fn id(&self) -> uuid::Uuid;

    /// Check if this matches another identifier
    fn matches_id(&self, id: uuid::Uuid) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a user-facing name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Positioned Trait
// ============================================================================

/// Trait for types placed on the world canvas
pub trait Positioned {
    /// Get the world-space top-left corner
    fn position(&self) -> crate::types::Position;

    /// Set the world-space top-left corner
    fn set_position(&mut self, position: crate::types::Position);

    /// Get the bounding rectangle
    fn bounds(&self) -> crate::types::Rect;

    /// Move by a relative offset
    fn translate(&mut self, dx: f64, dy: f64) {
        let pos = self.position();
        self.set_position(pos.offset(dx, dy));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, Rect, Size};
    use serde::Deserialize;

    struct Card {
        position: Position,
        size: Size,
    }

    impl Positioned for Card {
        fn position(&self) -> Position {
            self.position
        }

        fn set_position(&mut self, position: Position) {
            self.position = position;
        }

        fn bounds(&self) -> Rect {
            Rect::new(self.position, self.size)
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        title: String,
    }

    impl Persistable for Doc {}

    struct Flag(bool);

    impl Validatable for Flag {
        fn validate(&self) -> SchemaResult<()> {
            if self.0 {
                Ok(())
            } else {
                Err(SchemaError::Integrity("flag unset".to_string()))
            }
        }
    }

    #[test]
    fn test_positioned_translate() {
        let mut card = Card {
            position: Position::new(10.0, 10.0),
            size: Size::new(100.0, 50.0),
        };
        card.translate(5.0, -5.0);
        assert_eq!(card.position(), Position::new(15.0, 5.0));
        assert_eq!(card.bounds().center(), Position::new(65.0, 30.0));
    }

    #[test]
    fn test_persistable_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let doc = Doc {
            title: "orders".to_string(),
        };
        doc.save_to_file(&path).unwrap();
        let loaded = Doc::load_from_file(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_persistable_missing_file() {
        let result = Doc::load_from_file(std::path::Path::new("/nonexistent/doc.json"));
        assert!(matches!(result, Err(SchemaError::FileRead { .. })));
    }

    #[test]
    fn test_validatable_trait() {
        assert!(Flag(true).is_valid());
        assert!(!Flag(false).is_valid());
    }
}
