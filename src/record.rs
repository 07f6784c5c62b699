// Record trait for anything the task store persists

use serde::{Deserialize, Serialize};

/// A persisted record with a stable identity
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Collection name for this record type (e.g., "tasks")
    /// Used as the default key in the key-value store
    fn collection_name() -> &'static str
    where
        Self: Sized;
}
