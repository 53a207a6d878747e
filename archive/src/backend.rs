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

//! Pure-interface contract over an ordered key/value substrate (§4.10, C10).
//!
//! The archive never depends on a concrete storage engine directly; every
//! read and write goes through this trait so the embedded-KV and relational
//! backends (see the sibling `archive-rocksdb` and `archive-sql` crates) are
//! observationally equivalent.

use crate::error::BackendError;

pub type Key = Vec<u8>;
pub type Value = Vec<u8>;

/// One write inside an atomic [`Batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put(Key, Value),
    Delete(Key),
}

/// A set of writes committed together by [`BackendAdapter::write_batch`].
/// Either every op lands or none does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    pub ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Key, value: Value) {
        self.ops.push(BatchOp::Put(key, value));
    }

    pub fn delete(&mut self, key: Key) {
        self.ops.push(BatchOp::Delete(key));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Minimal substrate contract every archive backend must satisfy (§4.10).
///
/// Implementations MUST provide ACID-for-a-single-batch semantics and MUST
/// iterate `seek_range` in ascending key order.
pub trait BackendAdapter: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, BackendError>;

    fn write_batch(&self, batch: Batch) -> Result<(), BackendError>;

    /// Forward iterator over `[start, end]`, both bounds inclusive, in
    /// ascending key order.
    fn seek_range(&self, start: &[u8], end: &[u8]) -> Result<Box<dyn Iterator<Item = (Key, Value)> + '_>, BackendError>;

    /// The first record within `[start, end]`, if any.
    fn seek_first(&self, start: &[u8], end: &[u8]) -> Result<Option<(Key, Value)>, BackendError> {
        Ok(self.seek_range(start, end)?.next())
    }

    fn close(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
