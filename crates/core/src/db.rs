// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store.
//!
//! The [`Database`] struct reads the local unit table and the change outbox
//! filled by triggers on it. The relay only ever deletes or quarantines
//! outbox rows; units are read-only from its point of view.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::outbox::{OutboxRow, OutboxStatus};
use crate::unit::{Position, Unit, UnitStatus};

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- Units as maintained by the dispatch system
CREATE TABLE IF NOT EXISTS units (
    name TEXT PRIMARY KEY,
    status INTEGER NOT NULL DEFAULT 6,
    koord_x REAL,
    koord_y REAL
);

-- Change outbox written by triggers on units
CREATE TABLE IF NOT EXISTS webhook_outbox (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pk TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    status TEXT NOT NULL DEFAULT 'NEW',   -- NEW|DEAD
    correlation_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_outbox_status ON webhook_outbox(status, id);
"#;

/// Source of pending outbox rows.
pub trait OutboxSource {
    /// Returns all pending rows, oldest first. Does not modify any row.
    fn fetch_pending(&self) -> Result<Vec<OutboxRow>>;

    /// Removes a relayed row. Acknowledging a missing row is a no-op.
    fn acknowledge(&self, row_id: i64) -> Result<()>;

    /// Moves a row out of the pending set without removing it.
    fn quarantine(&self, row_id: i64) -> Result<()>;
}

/// Source of the locally known units.
pub trait UnitSource {
    /// Returns every local unit, ordered by name.
    fn local_units(&self) -> Result<Vec<Unit>>;
}

/// Convert a core error into the error type rusqlite row mappers return.
fn conversion_error(err: Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

/// Parse a timestamp written as RFC3339 or in SQLite's `CURRENT_TIMESTAMP`
/// form, with or without fractional seconds.
///
/// `created_at` is informational only, so an unreadable value yields `None`
/// rather than failing the whole query.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn outbox_row(row: &Row<'_>) -> std::result::Result<OutboxRow, rusqlite::Error> {
    let created_str: Option<String> = row.get(3)?;
    let status_str: String = row.get(4)?;

    Ok(OutboxRow {
        id: row.get(0)?,
        pk: row.get(1)?,
        payload: row.get(2)?,
        created_at: created_str.as_deref().and_then(parse_timestamp),
        status: status_str.parse().map_err(conversion_error)?,
        correlation_id: row.get(5)?,
    })
}

fn unit_row(row: &Row<'_>) -> std::result::Result<Unit, rusqlite::Error> {
    let status: i64 = row.get(1)?;
    let koord_x: Option<f64> = row.get(2)?;
    let koord_y: Option<f64> = row.get(3)?;

    Ok(Unit {
        id: None,
        name: row.get(0)?,
        status: UnitStatus::try_from(status).map_err(conversion_error)?,
        position: match (koord_x, koord_y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        },
    })
}

/// Run schema creation on a database connection.
///
/// Every statement is idempotent, so this is safe against a database whose
/// tables were created by the dispatch system itself.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with outbox and unit operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // The dispatch system writes concurrently through its triggers
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Insert or replace a local unit.
    pub fn upsert_unit(&self, unit: &Unit) -> Result<()> {
        self.conn.execute(
            "INSERT INTO units (name, status, koord_x, koord_y) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                 status = excluded.status,
                 koord_x = excluded.koord_x,
                 koord_y = excluded.koord_y",
            params![
                unit.name,
                unit.status.code(),
                unit.position.map(|p| p.longitude),
                unit.position.map(|p| p.latitude),
            ],
        )?;
        Ok(())
    }

    /// Append a change row to the outbox, returning its id.
    pub fn enqueue(&self, pk: &str, payload: &str, correlation_id: Option<&str>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO webhook_outbox (pk, payload, created_at, status, correlation_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pk,
                payload,
                Utc::now().to_rfc3339(),
                OutboxStatus::New.as_str(),
                correlation_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get an outbox row by id regardless of its status.
    pub fn get_outbox_row(&self, row_id: i64) -> Result<Option<OutboxRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pk, payload, created_at, status, correlation_id
             FROM webhook_outbox WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![row_id], outbox_row)?;
        Ok(rows.next().transpose()?)
    }

    /// Count rows with the given status.
    pub fn count_outbox(&self, status: OutboxStatus) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM webhook_outbox WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl OutboxSource for Database {
    fn fetch_pending(&self) -> Result<Vec<OutboxRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pk, payload, created_at, status, correlation_id
             FROM webhook_outbox WHERE status = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![OutboxStatus::New.as_str()], outbox_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn acknowledge(&self, row_id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM webhook_outbox WHERE id = ?1", params![row_id])?;
        Ok(())
    }

    fn quarantine(&self, row_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE webhook_outbox SET status = ?1 WHERE id = ?2",
            params![OutboxStatus::Dead.as_str(), row_id],
        )?;
        Ok(())
    }
}

impl UnitSource for Database {
    fn local_units(&self) -> Result<Vec<Unit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, status, koord_x, koord_y FROM units ORDER BY name")?;
        let units = stmt
            .query_map([], unit_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(units)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
