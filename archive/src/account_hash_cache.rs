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

//! Bounded cache of each account's most recent running `H_acct` (§4.9, C9).
//! Every block touching an account needs its previous running hash to
//! compute the new one; without this cache that would be a backend seek per
//! touched account per block. Capped at a fixed size since unbounded growth
//! would make memory usage proportional to the number of distinct accounts
//! ever touched rather than the working set.

use crate::backend::BackendAdapter;
use crate::codec;
use crate::error::BackendError;
use crate::types::{Address, Hash};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Default capacity (§4.9): large enough to cover a typical hot working set
/// of touched accounts without unbounded growth.
pub const DEFAULT_CAPACITY: usize = 100_000;

pub struct AccountHashCache {
    entries: Mutex<LruCache<Address, Hash>>,
}

impl AccountHashCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        AccountHashCache {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The account's running hash, or `Hash::zero()` if it has never been
    /// touched. Falls back to a single cold backend seek on a cache miss.
    pub fn get<B: BackendAdapter + ?Sized>(&self, backend: &B, address: Address) -> Result<Hash, BackendError> {
        if let Some(hash) = self.entries.lock().get(&address) {
            return Ok(*hash);
        }
        let (start, end) = codec::account_hash_range_full(address);
        let hash = match backend.seek_first(&start, &end)? {
            Some((_, value)) => Hash::from_bytes(value_to_hash_bytes(&value)),
            None => Hash::zero(),
        };
        self.entries.lock().put(address, hash);
        Ok(hash)
    }

    pub fn set(&self, address: Address, hash: Hash) {
        self.entries.lock().put(address, hash);
    }
}

fn value_to_hash_bytes(value: &[u8]) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(value);
    bytes
}
