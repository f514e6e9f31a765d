//! Database migrations and schema management.

use rusqlite::Connection;

use crate::error::StoreResult;

/// Creates the initial schema if it doesn't exist yet.
pub fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS events (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT    NOT NULL,
            date            TEXT,
            note            TEXT,
            color           TEXT,
            recurrence_rule TEXT,
            start_date      TEXT,
            end_date        TEXT,
            created_at      TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS events_date ON events(date);

        CREATE TABLE IF NOT EXISTS name_colors (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE,
            color_hex   TEXT    NOT NULL
        );
        ",
    )?;
    migrate_events_add_value(conn)?;
    Ok(())
}

fn migrate_events_add_value(conn: &Connection) -> StoreResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(events)")?;
    let rows = stmt.query_map([], |row| {
        let name: String = row.get(1)?;
        Ok(name)
    })?;
    for row in rows {
        if row? == "value" {
            return Ok(());
        }
    }

    conn.execute("ALTER TABLE events ADD COLUMN value REAL", [])?;
    Ok(())
}
