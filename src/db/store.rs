use anyhow::Result;
use rusqlite::Connection;

use crate::db::repository::MetaRepo;

/// Synchronous string key/value persistence surviving restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl KeyValueStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        MetaRepo::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        MetaRepo::set(self, key, value)
    }
}

#[cfg(test)]
pub use memory::MemoryStore;
