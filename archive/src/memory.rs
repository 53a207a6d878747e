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

//! An in-memory [`BackendAdapter`] used only by this crate's own tests,
//! mirroring the `kvdb_memorydb` double the teacher reaches for in its own
//! journal-DB tests.

use crate::backend::{BackendAdapter, Batch, BatchOp, Key, Value};
use crate::error::BackendError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<BTreeMap<Key, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackendAdapter for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, BackendError> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn write_batch(&self, batch: Batch) -> Result<(), BackendError> {
        let mut data = self.data.lock();
        for op in batch.ops {
            match op {
                BatchOp::Put(key, value) => {
                    data.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn seek_range(&self, start: &[u8], end: &[u8]) -> Result<Box<dyn Iterator<Item = (Key, Value)> + '_>, BackendError> {
        let matches: Vec<(Key, Value)> =
            self.data.lock().range(start.to_vec()..=end.to_vec()).map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(Box::new(matches.into_iter()))
    }
}

#[derive(Debug)]
struct InjectedFailure;

impl fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "injected backend failure")
    }
}

impl std::error::Error for InjectedFailure {}

/// Wraps a [`MemoryBackend`] and fails the next `write_batch` call once,
/// to exercise batch-atomicity behavior (P6) without a real faulty disk.
#[derive(Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    fail_next_write: AtomicBool,
}

impl FaultyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }
}

impl BackendAdapter for FaultyBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, BackendError> {
        self.inner.get(key)
    }

    fn write_batch(&self, batch: Batch) -> Result<(), BackendError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(BackendError::new(InjectedFailure));
        }
        self.inner.write_batch(batch)
    }

    fn seek_range(&self, start: &[u8], end: &[u8]) -> Result<Box<dyn Iterator<Item = (Key, Value)> + '_>, BackendError> {
        self.inner.seek_range(start, end)
    }
}
