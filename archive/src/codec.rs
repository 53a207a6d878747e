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

//! Binary key encoding for the six logical tables (§4.1, C1).
//!
//! Every key starts with a one-byte table tag followed by a shape specific
//! to that table. Block numbers are stored big-endian *inverted*
//! (`u64::MAX - block`) so that ascending iteration within a fixed prefix
//! visits the highest block first; a point-in-time query becomes "seek to
//! the key built from the requested block, take the first match".
//!
//! The exact byte layout is an implementation detail private to this crate:
//! nothing outside the archive reads these bytes directly, and no normative
//! test vector constrains them (only the accumulated hashes in §4.3/§4.4 are
//! normative). What matters is that encode/decode round-trip and that the
//! range helpers below return the correct "latest at or before" record.

use crate::types::{Address, BlockNumber, Reincarnation, SlotKey};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Table {
    Block = 0,
    AccountStatus = 1,
    Balance = 2,
    Nonce = 3,
    Code = 4,
    Storage = 5,
    AccountHash = 6,
}

/// `u64::MAX - block`, the trailing segment of every key (§4.1).
fn inv_block(block: BlockNumber) -> [u8; 8] {
    (u64::MAX - block).to_be_bytes()
}

pub fn block_key(block: BlockNumber) -> Vec<u8> {
    let mut key = vec![Table::Block as u8];
    key.extend_from_slice(&inv_block(block));
    key
}

fn account_key(table: Table, address: Address, block: BlockNumber) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 20 + 8);
    key.push(table as u8);
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(&inv_block(block));
    key
}

pub fn account_status_key(address: Address, block: BlockNumber) -> Vec<u8> {
    account_key(Table::AccountStatus, address, block)
}

pub fn balance_key(address: Address, block: BlockNumber) -> Vec<u8> {
    account_key(Table::Balance, address, block)
}

pub fn nonce_key(address: Address, block: BlockNumber) -> Vec<u8> {
    account_key(Table::Nonce, address, block)
}

pub fn code_key(address: Address, block: BlockNumber) -> Vec<u8> {
    account_key(Table::Code, address, block)
}

pub fn account_hash_key(address: Address, block: BlockNumber) -> Vec<u8> {
    account_key(Table::AccountHash, address, block)
}

pub fn storage_key(address: Address, reincarnation: Reincarnation, slot: SlotKey, block: BlockNumber) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 20 + 4 + 32 + 8);
    key.push(Table::Storage as u8);
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(&reincarnation.to_be_bytes());
    key.extend_from_slice(slot.as_bytes());
    key.extend_from_slice(&inv_block(block));
    key
}

/// `[prefix, prefix || 0xff*8]`, both ends inclusive: every key that can
/// exist under `prefix` regardless of block.
fn full_range(prefix: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut start = prefix.to_vec();
    start.extend_from_slice(&[0x00; 8]);
    let mut end = prefix.to_vec();
    end.extend_from_slice(&[0xff; 8]);
    (start, end)
}

/// `[prefix || invBlock(block), prefix || 0xff*8]`: the range to seek for
/// "the latest record under `prefix` at or before `block`" (§4.1, §4.6).
fn at_or_before_range(prefix: &[u8], block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    let mut start = prefix.to_vec();
    start.extend_from_slice(&inv_block(block));
    let mut end = prefix.to_vec();
    end.extend_from_slice(&[0xff; 8]);
    (start, end)
}

pub fn block_range_at_or_before(block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&[Table::Block as u8], block)
}

pub fn block_range_full() -> (Vec<u8>, Vec<u8>) {
    full_range(&[Table::Block as u8])
}

fn account_prefix(table: Table, address: Address) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(1 + 20);
    prefix.push(table as u8);
    prefix.extend_from_slice(address.as_bytes());
    prefix
}

pub fn account_status_range(address: Address, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&account_prefix(Table::AccountStatus, address), block)
}

pub fn balance_range(address: Address, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&account_prefix(Table::Balance, address), block)
}

pub fn nonce_range(address: Address, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&account_prefix(Table::Nonce, address), block)
}

pub fn code_range(address: Address, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&account_prefix(Table::Code, address), block)
}

pub fn account_hash_range(address: Address, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    at_or_before_range(&account_prefix(Table::AccountHash, address), block)
}

/// Full-history range used by the account-hash cache's cold lookup (§4.9):
/// the most recent `H_acct` for `address` regardless of block.
pub fn account_hash_range_full(address: Address) -> (Vec<u8>, Vec<u8>) {
    full_range(&account_prefix(Table::AccountHash, address))
}

pub fn storage_range(address: Address, reincarnation: Reincarnation, slot: SlotKey, block: BlockNumber) -> (Vec<u8>, Vec<u8>) {
    let mut prefix = Vec::with_capacity(1 + 20 + 4 + 32);
    prefix.push(Table::Storage as u8);
    prefix.extend_from_slice(address.as_bytes());
    prefix.extend_from_slice(&reincarnation.to_be_bytes());
    prefix.extend_from_slice(slot.as_bytes());
    at_or_before_range(&prefix, block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inv_block_is_order_reversing() {
        assert!(inv_block(1) > inv_block(5));
        assert!(inv_block(0) > inv_block(u64::MAX));
    }

    #[test]
    fn account_keys_sort_by_descending_block_within_prefix() {
        let addr = Address::from_bytes([1u8; 20]);
        let k1 = balance_key(addr, 1);
        let k5 = balance_key(addr, 5);
        let k100 = balance_key(addr, 100);
        assert!(k100 < k5);
        assert!(k5 < k1);
    }

    #[test]
    fn block_zero_is_reachable_in_its_own_at_or_before_range() {
        let addr = Address::from_bytes([2u8; 20]);
        let key0 = balance_key(addr, 0);
        let (start, end) = balance_range(addr, 0);
        assert!(start <= key0 && key0 <= end, "block 0's own key must lie within its at-or-before range");
    }
}
