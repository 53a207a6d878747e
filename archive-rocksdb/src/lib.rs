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

//! An embedded-KV [`BackendAdapter`] over RocksDB (§4.10). All six logical
//! tables share a single column family, distinguished only by their leading
//! tag byte; RocksDB's own key ordering already sorts the way `codec.rs`
//! needs.

#[macro_use]
extern crate log;
#[macro_use]
extern crate archive_logger;

use archive::{BackendAdapter, BackendError, Batch, BatchOp, Key, Value};
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

pub struct RocksDbBackend {
    db: DB,
}

impl RocksDbBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let display_path = path.as_ref().display().to_string();
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path).map_err(BackendError::new)?;
        cinfo!(BACKEND, "opened rocksdb archive at {}", display_path);
        Ok(RocksDbBackend {
            db,
        })
    }
}

impl BackendAdapter for RocksDbBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, BackendError> {
        self.db.get(key).map_err(BackendError::new)
    }

    fn write_batch(&self, batch: Batch) -> Result<(), BackendError> {
        let mut write_batch = WriteBatch::default();
        for op in batch.ops {
            match op {
                BatchOp::Put(key, value) => write_batch.put(key, value),
                BatchOp::Delete(key) => write_batch.delete(key),
            }
        }
        self.db.write(write_batch).map_err(BackendError::new)
    }

    fn seek_range(&self, start: &[u8], end: &[u8]) -> Result<Box<dyn Iterator<Item = (Key, Value)> + '_>, BackendError> {
        let end = end.to_vec();
        let iter = self
            .db
            .iterator(IteratorMode::From(start, rocksdb::Direction::Forward))
            .take_while(move |item| match item {
                Ok((key, _)) => key.as_ref() <= end.as_slice(),
                Err(_) => true,
            })
            .map(|item| {
                let (key, value) = item.expect("rocksdb iteration error");
                (key.to_vec(), value.to_vec())
            });
        Ok(Box::new(iter))
    }

    fn close(&self) -> Result<(), BackendError> {
        self.db.flush().map_err(BackendError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive::{Address, Archive, Balance, BlockUpdate, Hash, SlotUpdate};

    #[test]
    fn open_creates_a_fresh_archive_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RocksDbBackend::open(dir.path().join("archive")).unwrap();
        let archive = Archive::new(backend);
        assert!(archive.block_height().unwrap().is_none());
    }

    #[test]
    fn committed_blocks_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive");
        let addr = Address::from_bytes([7u8; 20]);

        {
            let backend = RocksDbBackend::open(&path).unwrap();
            let archive = Archive::new(backend);
            let mut update = BlockUpdate::new();
            update.created.push(addr);
            update.balance_updates.push((addr, Balance::from_u64(42)));
            update.slot_updates.push(SlotUpdate {
                address: addr,
                key: Hash::from_bytes([1u8; 32]),
                value: Hash::from_bytes([9u8; 32]),
            });
            archive.add(3, &update).unwrap();
            archive.close().unwrap();
        }

        let backend = RocksDbBackend::open(&path).unwrap();
        let archive = Archive::new(backend);
        assert_eq!(archive.block_height().unwrap().unwrap().block, 3);
        assert!(archive.exists(addr, 3).unwrap());
        assert_eq!(archive.get_balance(addr, 3).unwrap(), Balance::from_u64(42));
        assert_eq!(archive.get_storage(addr, Hash::from_bytes([1u8; 32]), 3).unwrap(), Hash::from_bytes([9u8; 32]));
    }

    #[test]
    fn seek_range_walks_keys_in_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RocksDbBackend::open(dir.path()).unwrap();
        let mut batch = Batch::new();
        batch.put(vec![1, 0, 0], vec![b'a']);
        batch.put(vec![1, 0, 2], vec![b'b']);
        batch.put(vec![1, 0, 1], vec![b'c']);
        backend.write_batch(batch).unwrap();

        let found: Vec<Key> = backend.seek_range(&[1, 0, 0], &[1, 0, 2]).unwrap().map(|(k, _)| k).collect();
        assert_eq!(found, vec![vec![1, 0, 0], vec![1, 0, 1], vec![1, 0, 2]]);
    }
}
