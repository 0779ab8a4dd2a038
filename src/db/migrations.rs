use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS prayer_times_cache (
            date        TEXT PRIMARY KEY,
            hijri_date  TEXT,
            fajr        TEXT NOT NULL DEFAULT '',
            sunrise     TEXT NOT NULL DEFAULT '',
            zuhr        TEXT NOT NULL DEFAULT '',
            asr         TEXT NOT NULL DEFAULT '',
            maghrib     TEXT NOT NULL DEFAULT '',
            isha        TEXT NOT NULL DEFAULT '',
            fetched_at  TEXT DEFAULT (datetime('now', 'localtime'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    Ok(())
}
