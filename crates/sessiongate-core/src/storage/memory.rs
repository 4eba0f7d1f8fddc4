use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{SessionStorage, StorageError};

/// In-memory storage. Clone is cheap and clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a single entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("qm_auth").unwrap(), None);

        storage.set("qm_auth", "{}").unwrap();
        assert_eq!(storage.get("qm_auth").unwrap().as_deref(), Some("{}"));

        storage.remove("qm_auth").unwrap();
        assert_eq!(storage.get("qm_auth").unwrap(), None);

        // Removing a missing key is a no-op
        storage.remove("qm_auth").unwrap();
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::with_entry("a", "1");
        let other = storage.clone();
        other.set("b", "2").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    }
}
