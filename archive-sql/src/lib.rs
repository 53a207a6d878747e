// Copyright 2019 Kodebox, Inc.
// This file is part of CodeChain.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! A relational [`BackendAdapter`] over SQLite. The six logical tables
//! described in `archive`'s `codec.rs` all live in one `(key, value)` BLOB
//! table here; ordering and prefix scans are expressed with `ORDER BY key`
//! and `key BETWEEN ?1 AND ?2` rather than a bespoke schema per table, so
//! this backend stays a drop-in replacement for the embedded-KV one (§4.10).

#[macro_use]
extern crate log;
#[macro_use]
extern crate archive_logger;

use archive::{BackendAdapter, BackendError, Batch, BatchOp, Key, Value};
use parking_lot::Mutex;
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::Path;

pub struct SqlBackend {
    conn: Mutex<Connection>,
}

impl SqlBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let display_path = path.as_ref().display().to_string();
        let conn = Connection::open(path).map_err(BackendError::new)?;
        let backend = Self::from_connection(conn)?;
        cinfo!(BACKEND, "opened sqlite archive at {}", display_path);
        Ok(backend)
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory().map_err(BackendError::new)?;
        let backend = Self::from_connection(conn)?;
        cinfo!(BACKEND, "opened in-memory sqlite archive");
        Ok(backend)
    }

    fn from_connection(conn: Connection) -> Result<Self, BackendError> {
        conn.execute("CREATE TABLE IF NOT EXISTS archive_kv (key BLOB PRIMARY KEY, value BLOB NOT NULL)", [])
            .map_err(BackendError::new)?;
        Ok(SqlBackend {
            conn: Mutex::new(conn),
        })
    }
}

impl BackendAdapter for SqlBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, BackendError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT value FROM archive_kv WHERE key = ?1", params![key], |row| row.get(0))
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(BackendError::new(other)),
            })
    }

    fn write_batch(&self, batch: Batch) -> Result<(), BackendError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).map_err(BackendError::new)?;
        for op in batch.ops {
            match op {
                BatchOp::Put(key, value) => {
                    tx.execute("INSERT OR REPLACE INTO archive_kv (key, value) VALUES (?1, ?2)", params![key, value])
                        .map_err(BackendError::new)?;
                }
                BatchOp::Delete(key) => {
                    tx.execute("DELETE FROM archive_kv WHERE key = ?1", params![key]).map_err(BackendError::new)?;
                }
            }
        }
        tx.commit().map_err(BackendError::new)
    }

    fn seek_range(&self, start: &[u8], end: &[u8]) -> Result<Box<dyn Iterator<Item = (Key, Value)> + '_>, BackendError> {
        let conn = self.conn.lock();
        let mut statement = conn
            .prepare("SELECT key, value FROM archive_kv WHERE key BETWEEN ?1 AND ?2 ORDER BY key ASC")
            .map_err(BackendError::new)?;
        let rows = statement
            .query_map(params![start, end], |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)))
            .map_err(BackendError::new)?;
        let collected: Vec<(Key, Value)> = rows.collect::<Result<_, _>>().map_err(BackendError::new)?;
        Ok(Box::new(collected.into_iter()))
    }
}
