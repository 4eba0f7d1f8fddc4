//! Persisted key-value storage holding the session record.
//!
//! This is the local-storage analogue the login flow writes to. The core only
//! ever reads from it (through `SessionAccessor`); `set` and `remove` exist for
//! the login/logout collaborators and for tests.
//!
//! Backends:
//! - `MemoryStorage`: in-process map, clones share state
//! - `FileStorage`: JSON object persisted on disk

pub mod error;
pub mod file;
pub mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key-value storage of string values.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
