//! Identifiers for stored records and transient board events.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Identifier of a sale record in the record store.
///
/// Records written by this crate get an id derived from their content and
/// creation time. Rows written by other tools without an id get one derived
/// from their raw text, so the same row keeps the same id between reads.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generate an id from input fields.
    /// Uses SHA256 and takes the first 16 hex characters.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a transient board event (celebration or highlight).
///
/// Each event expires on its own schedule, keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation_deterministic() {
        let id1 = RecordId::generate(&["Craig", "2025-06-15", "2025-06-15T09:00:00Z"]);
        let id2 = RecordId::generate(&["Craig", "2025-06-15", "2025-06-15T09:00:00Z"]);
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_record_id_different_inputs() {
        let id1 = RecordId::generate(&["Craig", "2025-06-15"]);
        let id2 = RecordId::generate(&["Jamie", "2025-06-15"]);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_field_boundaries_matter() {
        let id1 = RecordId::generate(&["ab", "c"]);
        let id2 = RecordId::generate(&["a", "bc"]);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_shape() {
        let id = RecordId::generate(&["test"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_record_id_empty() {
        assert!(RecordId::default().is_empty());
        assert!(RecordId::from("  ").is_empty());
        assert!(!RecordId::from("abc").is_empty());
    }

    #[test]
    fn test_record_id_serializes_as_string() {
        let id = RecordId::from("sale-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sale-1\"");
    }

    #[test]
    fn test_event_ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }
}
