pub mod migrations;
pub mod repository;
pub mod store;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub use store::KeyValueStore;

/// Open the database in WAL mode and bring the schema up to date.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Opening database at {:?}", path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    migrations::run_migrations(&conn)?;
    Ok(conn)
}
