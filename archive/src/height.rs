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

//! The block height index (§4.7, C7): the archive's tip, kept hot in memory
//! and refreshed from the backend at most once per process lifetime.

use crate::backend::BackendAdapter;
use crate::codec;
use crate::error::BackendError;
use crate::types::{BlockNumber, Hash};
use parking_lot::Mutex;

#[derive(Clone, Copy, Debug)]
pub struct Tip {
    pub block: BlockNumber,
    pub hash: Hash,
    pub is_empty: bool,
}

pub fn encode_block_record(hash: Hash, is_empty: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(33);
    buf.push(is_empty as u8);
    buf.extend_from_slice(hash.as_bytes());
    buf
}

pub fn decode_block_record(bytes: &[u8]) -> (Hash, bool) {
    assert_eq!(bytes.len(), 33, "block record value must be 33 bytes");
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes[1..]);
    (Hash::from_bytes(hash), bytes[0] != 0)
}

/// `None` until the first block is ever committed; genuinely empty archives
/// have no tip at all (distinct from a tip whose block happens to be empty).
pub struct HeightIndex {
    tip: Mutex<Option<Tip>>,
}

impl HeightIndex {
    pub fn new() -> Self {
        HeightIndex {
            tip: Mutex::new(None),
        }
    }

    /// Returns the current tip, loading it from the backend on first use.
    pub fn get<B: BackendAdapter + ?Sized>(&self, backend: &B) -> Result<Option<Tip>, BackendError> {
        let mut guard = self.tip.lock();
        if guard.is_none() {
            let (start, end) = codec::block_range_full();
            // `block_range_full` walks ascending keys, which (thanks to the
            // inverted block-number encoding) means the first hit is the
            // highest block ever recorded.
            if let Some((key, value)) = backend.seek_first(&start, &end)? {
                let (hash, is_empty) = decode_block_record(&value);
                let tip = Tip {
                    block: block_from_block_key(&key),
                    hash,
                    is_empty,
                };
                cdebug!(HEIGHT, "cold-loaded tip at block {} from backend", tip.block);
                *guard = Some(tip);
            }
        }
        Ok(*guard)
    }

    /// Called only after a successful commit; never observed concurrently
    /// with another writer thanks to the archive's single-writer mutex.
    pub fn set(&self, tip: Tip) {
        *self.tip.lock() = Some(tip);
    }
}

impl Default for HeightIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn block_from_block_key(key: &[u8]) -> BlockNumber {
    assert_eq!(key.len(), 9, "block key must be 1 tag byte + 8 inv-block bytes");
    let mut inv = [0u8; 8];
    inv.copy_from_slice(&key[1..]);
    u64::MAX - u64::from_be_bytes(inv)
}
