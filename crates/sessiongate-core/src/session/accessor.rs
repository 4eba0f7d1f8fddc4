use std::sync::Arc;

use tracing::{debug, warn};

use super::{SessionRecord, SessionState, SESSION_KEY};
use crate::storage::SessionStorage;

/// The single read path into the session store.
///
/// Both the request authenticator and the route guard go through `read`, so
/// malformed or unreadable storage is handled in exactly one place. Clone is
/// cheap; clones share the underlying storage.
#[derive(Clone)]
pub struct SessionAccessor {
    storage: Arc<dyn SessionStorage>,
}

impl SessionAccessor {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn from_storage<S: SessionStorage + 'static>(storage: S) -> Self {
        Self::new(Arc::new(storage))
    }

    /// Read a point-in-time snapshot of the session. Never fails: any storage
    /// error or malformed value reads as `SessionState::Absent`.
    pub fn read(&self) -> SessionState {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No session stored");
                return SessionState::Absent;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session storage, treating as signed out");
                return SessionState::Absent;
            }
        };

        match SessionRecord::parse(&raw) {
            Ok(record) => SessionState::Present(record),
            Err(e) => {
                warn!(error = %e, "Malformed session record, treating as signed out");
                SessionState::Absent
            }
        }
    }
}

impl std::fmt::Debug for SessionAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAccessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    fn accessor_with(raw: &str) -> SessionAccessor {
        SessionAccessor::from_storage(MemoryStorage::with_entry(SESSION_KEY, raw))
    }

    #[test]
    fn test_read_empty_storage_is_absent() {
        let accessor = SessionAccessor::from_storage(MemoryStorage::new());
        assert_eq!(accessor.read(), SessionState::Absent);
    }

    #[test]
    fn test_read_malformed_values_are_absent() {
        for raw in ["", "{", "not json", "null", "42", "true", "[]", r#""t1""#] {
            assert_eq!(accessor_with(raw).read(), SessionState::Absent, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_read_storage_error_is_absent() {
        let accessor = SessionAccessor::from_storage(BrokenStorage);
        assert_eq!(accessor.read(), SessionState::Absent);
    }

    #[test]
    fn test_read_valid_record() {
        let state = accessor_with(r#"{"token":"t1","user":{"role":"user"}}"#).read();
        assert_eq!(state.bearer_token(), Some("t1"));
        assert_eq!(state.record().and_then(SessionRecord::user_role), Some("user"));
    }

    #[test]
    fn test_read_ignores_other_keys() {
        let storage = MemoryStorage::with_entry("other", r#"{"token":"t1"}"#);
        assert_eq!(SessionAccessor::from_storage(storage).read(), SessionState::Absent);
    }

    #[test]
    fn test_read_is_not_cached() {
        let storage = MemoryStorage::new();
        let accessor = SessionAccessor::from_storage(storage.clone());
        assert!(!accessor.read().is_present());

        storage.set(SESSION_KEY, r#"{"token":"t1"}"#).unwrap();
        assert_eq!(accessor.read().bearer_token(), Some("t1"));

        storage.remove(SESSION_KEY).unwrap();
        assert!(!accessor.read().is_present());
    }
}
