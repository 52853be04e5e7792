//! SQLite-based read-marking store
//!
//! Keeps read-markings on local disk so a reader can record progress while
//! offline and replay it later.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::ReadMarkingStore;
use crate::error::{KomError, Result};
use crate::models::{ConfNo, GlobalReadMarking, LocalReadMarking, LocalTextNo, TextNo};

/// Database migrations
///
/// The user_version pragma tracks which migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            CREATE TABLE global_read_markings (
                text_no INTEGER PRIMARY KEY,
                unread INTEGER NOT NULL,
                updated_at TEXT
            );

            CREATE TABLE local_read_markings (
                conf_no INTEGER NOT NULL,
                local_text_no INTEGER NOT NULL,
                text_no INTEGER NOT NULL,
                unread INTEGER NOT NULL,
                updated_at TEXT,
                PRIMARY KEY (conf_no, local_text_no)
            );

            CREATE INDEX idx_local_read_markings_text_no
                ON local_read_markings(text_no);
            "#,
        ),
    ])
}

/// SQLite-backed implementation of [`ReadMarkingStore`]
pub struct SqliteReadMarkingStore {
    conn: Mutex<Connection>,
}

impl SqliteReadMarkingStore {
    /// Open (or create) the store at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;
        debug!("Opened read-marking store at {:?}", db_path.as_ref());
        Self::with_connection(conn)
    }

    /// Open a store that lives only as long as the value
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        // WAL keeps readers unblocked while a marking is written
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations().to_latest(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| KomError::Storage {
            message: "read-marking store lock poisoned".to_string(),
        })
    }

    /// Number of stored markings, global and local
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM global_read_markings)
                  + (SELECT COUNT(*) FROM local_read_markings)",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl ReadMarkingStore for SqliteReadMarkingStore {
    fn save_global_read_marking(&self, marking: &GlobalReadMarking) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO global_read_markings (text_no, unread, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(text_no) DO UPDATE SET
                unread = excluded.unread,
                updated_at = datetime('now')",
            params![marking.text_no.0, marking.unread],
        )?;
        Ok(())
    }

    fn delete_global_read_marking(&self, text_no: TextNo) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM global_read_markings WHERE text_no = ?1",
            [text_no.0],
        )?;
        Ok(())
    }

    fn get_global_read_marking(&self, text_no: TextNo) -> Result<Option<GlobalReadMarking>> {
        let conn = self.conn()?;
        let marking = conn
            .query_row(
                "SELECT unread FROM global_read_markings WHERE text_no = ?1",
                [text_no.0],
                |row| {
                    Ok(GlobalReadMarking {
                        text_no,
                        unread: row.get(0)?,
                    })
                },
            )
            .optional()?;
        Ok(marking)
    }

    fn save_local_read_marking(&self, marking: &LocalReadMarking) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO local_read_markings (conf_no, local_text_no, text_no, unread, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))
             ON CONFLICT(conf_no, local_text_no) DO UPDATE SET
                text_no = excluded.text_no,
                unread = excluded.unread,
                updated_at = datetime('now')",
            params![
                marking.conf_no.0,
                marking.local_text_no.0,
                marking.text_no.0,
                marking.unread
            ],
        )?;
        Ok(())
    }

    fn delete_local_read_marking(
        &self,
        conf_no: ConfNo,
        local_text_no: LocalTextNo,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM local_read_markings WHERE conf_no = ?1 AND local_text_no = ?2",
            params![conf_no.0, local_text_no.0],
        )?;
        Ok(())
    }

    fn list_local_read_markings(&self, conf_no: ConfNo) -> Result<Vec<LocalReadMarking>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT local_text_no, text_no, unread FROM local_read_markings
             WHERE conf_no = ?1
             ORDER BY local_text_no ASC",
        )?;

        let markings = stmt
            .query_map([conf_no.0], |row| {
                Ok(LocalReadMarking {
                    conf_no,
                    local_text_no: LocalTextNo(row.get(0)?),
                    text_no: TextNo(row.get(1)?),
                    unread: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(markings)
    }
}
