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

//! Point-in-time reads (§4.6, C6). Every lookup here is "the latest record
//! at or before block B", answered with a single forward seek thanks to the
//! inverted block-number key encoding (`codec.rs`).

use crate::backend::BackendAdapter;
use crate::codec;
use crate::error::BackendError;
use crate::types::{Address, AccountStatus, Balance, BlockNumber, Code, Hash, Nonce, SlotKey, SlotValue};

pub(crate) fn account_status_at<B: BackendAdapter + ?Sized>(
    backend: &B,
    address: Address,
    block: BlockNumber,
) -> Result<AccountStatus, BackendError> {
    let (start, end) = codec::account_status_range(address, block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => Ok(AccountStatus::from_bytes(&value)),
        None => Ok(AccountStatus::ABSENT),
    }
}

pub fn exists<B: BackendAdapter + ?Sized>(backend: &B, address: Address, block: BlockNumber) -> Result<bool, BackendError> {
    Ok(account_status_at(backend, address, block)?.exists)
}

pub fn reincarnation<B: BackendAdapter + ?Sized>(
    backend: &B,
    address: Address,
    block: BlockNumber,
) -> Result<crate::types::Reincarnation, BackendError> {
    Ok(account_status_at(backend, address, block)?.reincarnation)
}

pub fn get_balance<B: BackendAdapter + ?Sized>(backend: &B, address: Address, block: BlockNumber) -> Result<Balance, BackendError> {
    let (start, end) = codec::balance_range(address, block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => {
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&value);
            Ok(Balance::from_be_bytes16(&bytes))
        }
        None => Ok(Balance::default()),
    }
}

pub fn get_nonce<B: BackendAdapter + ?Sized>(backend: &B, address: Address, block: BlockNumber) -> Result<Nonce, BackendError> {
    let (start, end) = codec::nonce_range(address, block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&value);
            Ok(Nonce::from_be_bytes(&bytes))
        }
        None => Ok(Nonce::default()),
    }
}

/// `None` if the account has never had code recorded at or before `block`,
/// matching the way absence and empty-but-present code are both represented
/// by "no record written" (§9).
pub fn get_code<B: BackendAdapter + ?Sized>(backend: &B, address: Address, block: BlockNumber) -> Result<Option<Code>, BackendError> {
    let (start, end) = codec::code_range(address, block);
    Ok(backend.seek_first(&start, &end)?.map(|(_, value)| value))
}

pub fn get_account_hash<B: BackendAdapter + ?Sized>(backend: &B, address: Address, block: BlockNumber) -> Result<Hash, BackendError> {
    let (start, end) = codec::account_hash_range(address, block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&value);
            Ok(Hash::from_bytes(bytes))
        }
        None => Ok(Hash::zero()),
    }
}

/// Storage is scoped to the account's *current* reincarnation at `block`; a
/// deleted-then-recreated account never observes slots written by an earlier
/// incarnation, and a currently-absent account always reads as zero (§3, I4).
pub fn get_storage<B: BackendAdapter + ?Sized>(
    backend: &B,
    address: Address,
    key: SlotKey,
    block: BlockNumber,
) -> Result<SlotValue, BackendError> {
    let status = account_status_at(backend, address, block)?;
    if !status.exists {
        return Ok(Hash::zero());
    }
    let (start, end) = codec::storage_range(address, status.reincarnation, key, block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&value);
            Ok(Hash::from_bytes(bytes))
        }
        None => Ok(Hash::zero()),
    }
}

/// The hash of the most recent block at or before `block`, or `Hash::zero()`
/// if the archive has no recorded blocks at or before it at all (§4.4).
pub fn get_hash<B: BackendAdapter + ?Sized>(backend: &B, block: BlockNumber) -> Result<Hash, BackendError> {
    let (start, end) = codec::block_range_at_or_before(block);
    match backend.seek_first(&start, &end)? {
        Some((_, value)) => {
            let (hash, _is_empty) = crate::height::decode_block_record(&value);
            Ok(hash)
        }
        None => Ok(Hash::zero()),
    }
}
