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

//! The account delta hasher (§4.3, C3) and the block accumulator that folds
//! per-account hashes into a new block hash (§4.4, C4).
//!
//! Three byte-order conventions are load-bearing for cross-implementation
//! hash compatibility and must never be "tidied up": the code-length prefix
//! is little-endian, block numbers inside keys are big-endian inverted
//! (see `codec.rs`), and the balance fed into the hash is always the 32-byte
//! big-endian canonical form, never the compact 16-byte on-disk form (§9).

use crate::normalize::AccountUpdate;
use crate::types::Hash;
use sha2::{Digest, Sha256};

const BIT_CREATED: u8 = 0b0000_0001;
const BIT_DELETED: u8 = 0b0000_0010;
const BIT_BALANCE: u8 = 0b0000_0100;
const BIT_NONCE: u8 = 0b0000_1000;
const BIT_CODE: u8 = 0b0001_0000;

/// `H_delta`: the content hash of one account's delta within a block (§4.3).
pub fn account_delta_hash(update: &AccountUpdate) -> Hash {
    let mut state_byte = 0u8;
    if update.created {
        state_byte |= BIT_CREATED;
    }
    if update.deleted {
        state_byte |= BIT_DELETED;
    }
    if update.balance.is_some() {
        state_byte |= BIT_BALANCE;
    }
    if update.nonce.is_some() {
        state_byte |= BIT_NONCE;
    }
    if update.code.is_some() {
        state_byte |= BIT_CODE;
    }

    let mut hasher = Sha256::new();
    hasher.update([state_byte]);
    if let Some(balance) = update.balance {
        hasher.update(balance.to_canonical_32());
    }
    if let Some(nonce) = update.nonce {
        hasher.update(nonce.to_be_bytes());
    }
    if let Some(code) = &update.code {
        hasher.update((code.len() as u32).to_le_bytes());
        hasher.update(code);
    }
    for (key, value) in &update.slots {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    Hash::from_bytes(hasher.finalize().into())
}

/// `H_acct(B) = sha256(H_acct(B_prev) || H_delta(B))` (§3).
pub fn chain_account_hash(prev: Hash, delta: Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(prev.as_bytes());
    hasher.update(delta.as_bytes());
    Hash::from_bytes(hasher.finalize().into())
}

/// Folds the previous block hash and every touched account's new running
/// hash, in ascending address order, into the new block hash (§4.4).
pub struct BlockAccumulator {
    hasher: Sha256,
}

impl BlockAccumulator {
    pub fn new(prev_block_hash: Hash) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prev_block_hash.as_bytes());
        BlockAccumulator {
            hasher,
        }
    }

    pub fn absorb_account_hash(&mut self, account_hash: Hash) {
        self.hasher.update(account_hash.as_bytes());
    }

    pub fn finish(self) -> Hash {
        Hash::from_bytes(self.hasher.finalize().into())
    }
}
