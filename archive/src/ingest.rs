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

//! Block ingestion (§4.5, C5): turns one [`BlockUpdate`] into a single
//! atomic backend batch, folding per-account hashes into the new block hash
//! along the way.
//!
//! Same-block create+delete of one account is resolved deletions-first
//! (§4.5's open question): the delete bump is applied, then the create
//! bump, so an account both deleted and created in one block ends the
//! block `Live` at `prior_reincarnation + 2`, and any slot writes in that
//! block are scoped to that final reincarnation.

use crate::account_hash_cache::AccountHashCache;
use crate::backend::{Batch, BackendAdapter};
use crate::codec;
use crate::error::{ArchiveError, Result};
use crate::hash::{account_delta_hash, chain_account_hash, BlockAccumulator};
use crate::height::{encode_block_record, HeightIndex, Tip};
use crate::normalize::{normalize, AccountUpdate};
use crate::query::account_status_at;
use crate::reincarnation_cache::ReincarnationCache;
use crate::types::{Address, AccountStatus, BlockNumber, Hash, Reincarnation};
use crate::update::BlockUpdate;

fn resolve_prior_reincarnation<B: BackendAdapter + ?Sized>(
    backend: &B,
    reinc_cache: &ReincarnationCache,
    address: Address,
    block: BlockNumber,
) -> Result<Reincarnation> {
    if let Some(reincarnation) = reinc_cache.get(address) {
        return Ok(reincarnation);
    }
    Ok(account_status_at(backend, address, block)?.reincarnation)
}

struct TouchedAccount {
    address: Address,
    reincarnation: Reincarnation,
    account_hash: Hash,
}

fn apply_account_update<B: BackendAdapter + ?Sized>(
    backend: &B,
    reinc_cache: &ReincarnationCache,
    hash_cache: &AccountHashCache,
    batch: &mut Batch,
    block: BlockNumber,
    address: Address,
    update: &AccountUpdate,
) -> Result<TouchedAccount> {
    let prior_reincarnation = resolve_prior_reincarnation(backend, reinc_cache, address, block)?;
    let is_transition = update.created || update.deleted;
    let mut reincarnation = prior_reincarnation;
    if update.deleted {
        reincarnation = reincarnation.next();
    }
    if update.created {
        reincarnation = reincarnation.next();
    }

    if is_transition {
        let status = AccountStatus {
            exists: update.created,
            reincarnation,
        };
        batch.put(codec::account_status_key(address, block), status.to_bytes().to_vec());
    }

    if let Some(balance) = update.balance {
        batch.put(codec::balance_key(address, block), balance.to_be_bytes16().to_vec());
    }
    if let Some(nonce) = update.nonce {
        batch.put(codec::nonce_key(address, block), nonce.to_be_bytes().to_vec());
    }
    if let Some(code) = &update.code {
        batch.put(codec::code_key(address, block), code.clone());
    }
    for (key, value) in &update.slots {
        batch.put(codec::storage_key(address, reincarnation, *key, block), value.as_bytes().to_vec());
    }

    let prior_account_hash = hash_cache.get(backend, address)?;
    let delta = account_delta_hash(update);
    let account_hash = chain_account_hash(prior_account_hash, delta);
    batch.put(codec::account_hash_key(address, block), account_hash.as_bytes().to_vec());

    Ok(TouchedAccount {
        address,
        reincarnation,
        account_hash,
    })
}

/// Commits `update` as `block`. Returns the new block hash.
///
/// `block` must be strictly greater than the archive's current tip, if any
/// (§3, I1). An empty update propagates the previous block's hash verbatim
/// without touching any per-account state (§4.4).
pub fn add<B: BackendAdapter + ?Sized>(
    backend: &B,
    height: &HeightIndex,
    reinc_cache: &ReincarnationCache,
    hash_cache: &AccountHashCache,
    block: BlockNumber,
    update: &BlockUpdate,
) -> Result<Hash> {
    let tip = height.get(backend).map_err(ArchiveError::from)?;
    if let Some(tip) = tip {
        if block <= tip.block {
            cwarn!(INGEST, "rejecting block {} as out of order, tip is at {}", block, tip.block);
            return Err(ArchiveError::OutOfOrder {
                requested: block,
                last: tip.block,
            });
        }
    }
    let prev_hash = tip.map(|t| t.hash).unwrap_or_else(Hash::zero);

    if update.is_empty() {
        let mut batch = Batch::new();
        batch.put(codec::block_key(block), encode_block_record(prev_hash, true));
        backend.write_batch(batch).map_err(ArchiveError::from)?;
        height.set(Tip {
            block,
            hash: prev_hash,
            is_empty: true,
        });
        cdebug!(INGEST, "committed empty block {}", block);
        return Ok(prev_hash);
    }

    let normalized = normalize(update);
    let mut batch = Batch::new();
    let mut accumulator = BlockAccumulator::new(prev_hash);
    let mut touched = Vec::with_capacity(normalized.accounts.len());

    for (address, account_update) in &normalized.accounts {
        let result = apply_account_update(backend, reinc_cache, hash_cache, &mut batch, block, *address, account_update)?;
        accumulator.absorb_account_hash(result.account_hash);
        touched.push(result);
    }

    let block_hash = accumulator.finish();
    batch.put(codec::block_key(block), encode_block_record(block_hash, false));

    backend.write_batch(batch).map_err(ArchiveError::from)?;

    let touched_count = touched.len();
    for account in touched {
        reinc_cache.set(account.address, account.reincarnation);
        hash_cache.set(account.address, account.account_hash);
    }
    height.set(Tip {
        block,
        hash: block_hash,
        is_empty: false,
    });
    cdebug!(INGEST, "committed block {} touching {} accounts", block, touched_count);

    Ok(block_hash)
}
