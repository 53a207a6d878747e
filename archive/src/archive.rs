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

//! Wires the components (C1-C10) together behind the public API (§6).

use crate::account_hash_cache::{AccountHashCache, DEFAULT_CAPACITY};
use crate::backend::BackendAdapter;
use crate::error::{ArchiveError, Result};
use crate::height::HeightIndex;
use crate::ingest;
use crate::query;
use crate::reincarnation_cache::ReincarnationCache;
use crate::types::{Address, Balance, BlockNumber, Code, Hash, Nonce, Reincarnation, SlotKey, SlotValue};
use crate::update::BlockUpdate;
use parking_lot::Mutex;

/// Reported by [`Archive::block_height`]: the archive's tip, or `None` if no
/// block has ever been committed.
#[derive(Clone, Copy, Debug)]
pub struct BlockHeight {
    pub block: BlockNumber,
    pub is_empty: bool,
}

/// A block-indexed historical state archive over one [`BackendAdapter`].
///
/// `add` is serialized by `add_mutex` (§5); every other method reads through
/// to the backend directly and never blocks on a writer.
pub struct Archive<B: BackendAdapter> {
    backend: B,
    add_mutex: Mutex<()>,
    height: HeightIndex,
    reincarnation_cache: ReincarnationCache,
    account_hash_cache: AccountHashCache,
}

impl<B: BackendAdapter> Archive<B> {
    pub fn new(backend: B) -> Self {
        Self::with_account_hash_cache_capacity(backend, DEFAULT_CAPACITY)
    }

    pub fn with_account_hash_cache_capacity(backend: B, account_hash_cache_capacity: usize) -> Self {
        Archive {
            backend,
            add_mutex: Mutex::new(()),
            height: HeightIndex::new(),
            reincarnation_cache: ReincarnationCache::new(),
            account_hash_cache: AccountHashCache::new(account_hash_cache_capacity),
        }
    }

    /// Commits `update` as `block` (§4.5). Rejects `block <= last committed
    /// block` (§3, I1).
    pub fn add(&self, block: BlockNumber, update: &BlockUpdate) -> Result<Hash> {
        let _guard = self.add_mutex.lock();
        ingest::add(&self.backend, &self.height, &self.reincarnation_cache, &self.account_hash_cache, block, update)
    }

    /// The archive's current tip, or `None` if nothing has been committed yet.
    pub fn block_height(&self) -> Result<Option<BlockHeight>> {
        Ok(self.height.get(&self.backend)?.map(|tip| BlockHeight {
            block: tip.block,
            is_empty: tip.is_empty,
        }))
    }

    pub fn exists(&self, address: Address, block: BlockNumber) -> Result<bool> {
        Ok(query::exists(&self.backend, address, block)?)
    }

    pub fn reincarnation(&self, address: Address, block: BlockNumber) -> Result<Reincarnation> {
        Ok(query::reincarnation(&self.backend, address, block)?)
    }

    pub fn get_balance(&self, address: Address, block: BlockNumber) -> Result<Balance> {
        Ok(query::get_balance(&self.backend, address, block)?)
    }

    pub fn get_nonce(&self, address: Address, block: BlockNumber) -> Result<Nonce> {
        Ok(query::get_nonce(&self.backend, address, block)?)
    }

    pub fn get_code(&self, address: Address, block: BlockNumber) -> Result<Option<Code>> {
        Ok(query::get_code(&self.backend, address, block)?)
    }

    pub fn get_storage(&self, address: Address, key: SlotKey, block: BlockNumber) -> Result<SlotValue> {
        Ok(query::get_storage(&self.backend, address, key, block)?)
    }

    pub fn get_account_hash(&self, address: Address, block: BlockNumber) -> Result<Hash> {
        Ok(query::get_account_hash(&self.backend, address, block)?)
    }

    /// The hash of the most recent block at or before `block` (§4.4).
    pub fn get_hash(&self, block: BlockNumber) -> Result<Hash> {
        Ok(query::get_hash(&self.backend, block)?)
    }

    /// Optional extension for light-client-style witness proofs (§4.15, §7).
    /// This archive variant never implements it.
    pub fn witness_proof(&self, _address: Address, _block: BlockNumber) -> Result<Vec<u8>> {
        Err(ArchiveError::WitnessProofNotSupported)
    }

    /// Optional extension for exporting full state as a genesis fixture (§4.15, §7).
    /// This archive variant never implements it.
    pub fn export_genesis(&self, _block: BlockNumber) -> Result<Vec<u8>> {
        Err(ArchiveError::GenesisExportNotSupported)
    }

    pub fn close(&self) -> Result<()> {
        Ok(self.backend.close()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::memory::{FaultyBackend, MemoryBackend};
    use crate::update::SlotUpdate;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn slot(b: u8) -> SlotKey {
        Hash::from_bytes([b; 32])
    }

    // S1
    #[test]
    fn scenario_one_tracks_history_across_blocks_and_an_empty_block() {
        let archive = Archive::new(MemoryBackend::new());
        let a1 = addr(1);

        let mut block1 = BlockUpdate::new();
        block1.created.push(a1);
        block1.balance_updates.push((a1, Balance::from_u64(0x12)));
        block1.slot_updates.push(SlotUpdate {
            address: a1,
            key: slot(0x05),
            value: Hash::from_bytes({
                let mut v = [0u8; 32];
                v[31] = 0x47;
                v
            }),
        });
        archive.add(1, &block1).unwrap();

        let mut block5 = BlockUpdate::new();
        block5.balance_updates.push((a1, Balance::from_u64(0x34)));
        block5.code_updates.push((a1, vec![0x12, 0x23]));
        block5.nonce_updates.push((a1, Nonce(0x54)));
        block5.slot_updates.push(SlotUpdate {
            address: a1,
            key: slot(0x05),
            value: Hash::from_bytes({
                let mut v = [0u8; 32];
                v[31] = 0x89;
                v
            }),
        });
        archive.add(5, &block5).unwrap();

        archive.add(7, &BlockUpdate::new()).unwrap();

        assert_eq!(archive.get_balance(a1, 1).unwrap(), Balance::from_u64(0x12));
        assert_eq!(archive.get_balance(a1, 3).unwrap(), Balance::from_u64(0x12));
        assert_eq!(archive.get_balance(a1, 5).unwrap(), Balance::from_u64(0x34));
        assert_eq!(archive.get_code(a1, 3).unwrap(), None);
        assert_eq!(archive.get_code(a1, 5).unwrap(), Some(vec![0x12, 0x23]));
        assert_eq!(archive.get_nonce(a1, 4).unwrap(), Nonce(0));
        assert_eq!(archive.get_nonce(a1, 5).unwrap(), Nonce(0x54));
        assert_eq!(archive.get_storage(a1, slot(0x05), 0).unwrap(), Hash::zero());
        assert_eq!(archive.get_storage(a1, slot(0x05), 6).unwrap().as_bytes()[31], 0x89);

        let height = archive.block_height().unwrap().unwrap();
        assert_eq!(height.block, 7);
        assert!(!height.is_empty);
        assert_eq!(archive.get_hash(5).unwrap(), archive.get_hash(7).unwrap());
        assert_ne!(archive.get_hash(1).unwrap(), archive.get_hash(5).unwrap());
    }

    // S2 + P3: delete then re-create makes storage unreadable across the gap.
    #[test]
    fn storage_is_masked_across_a_delete_and_recreate() {
        let archive = Archive::new(MemoryBackend::new());
        let a1 = addr(1);

        let mut block1 = BlockUpdate::new();
        block1.created.push(a1);
        block1.slot_updates.push(SlotUpdate {
            address: a1,
            key: slot(0x05),
            value: Hash::from_bytes([0x47; 32]),
        });
        archive.add(1, &block1).unwrap();

        let mut block5 = BlockUpdate::new();
        block5.deleted.push(a1);
        archive.add(5, &block5).unwrap();

        let mut block9 = BlockUpdate::new();
        block9.created.push(a1);
        archive.add(9, &block9).unwrap();

        assert!(archive.exists(a1, 1).unwrap());
        assert!(!archive.exists(a1, 5).unwrap());
        assert!(archive.exists(a1, 9).unwrap());
        assert_eq!(archive.get_storage(a1, slot(0x05), 1).unwrap(), Hash::from_bytes([0x47; 32]));
        assert_eq!(archive.get_storage(a1, slot(0x05), 5).unwrap(), Hash::zero());
        assert_eq!(archive.get_storage(a1, slot(0x05), 9).unwrap(), Hash::zero());
    }

    // S3 + P6: a rejected out-of-order add leaves the archive untouched.
    #[test]
    fn out_of_order_add_is_rejected_and_has_no_effect() {
        let archive = Archive::new(MemoryBackend::new());
        let a1 = addr(1);

        let mut block2 = BlockUpdate::new();
        block2.created.push(a1);
        archive.add(2, &block2).unwrap();

        let mut block1 = BlockUpdate::new();
        block1.created.push(a1);
        block1.slot_updates.push(SlotUpdate {
            address: a1,
            key: slot(0x05),
            value: Hash::from_bytes([1u8; 32]),
        });
        let err = archive.add(1, &block1).unwrap_err();
        assert!(matches!(err, ArchiveError::OutOfOrder { requested: 1, last: 2 }));
        assert_eq!(archive.get_storage(a1, slot(0x05), 1).unwrap(), Hash::zero());
    }

    // S4 + P4: empty blocks propagate the last non-empty block's hash verbatim.
    #[test]
    fn empty_blocks_propagate_the_prior_hash() {
        let archive = Archive::new(MemoryBackend::new());
        let a1 = addr(1);

        archive.add(0, &BlockUpdate::new()).unwrap();
        archive.add(1, &BlockUpdate::new()).unwrap();
        let mut block2 = BlockUpdate::new();
        block2.created.push(a1);
        archive.add(2, &block2).unwrap();
        archive.add(3, &BlockUpdate::new()).unwrap();
        archive.add(4, &BlockUpdate::new()).unwrap();

        assert_eq!(archive.get_hash(1).unwrap(), Hash::zero());
        let h2 = archive.get_hash(2).unwrap();
        assert_ne!(h2, Hash::zero());
        assert_eq!(archive.get_hash(3).unwrap(), h2);
        assert_eq!(archive.get_hash(4).unwrap(), h2);
    }

    // S5 + P1: re-submitting the same block number always fails.
    #[test]
    fn resubmitting_the_same_block_fails() {
        let archive = Archive::new(MemoryBackend::new());
        archive.add(0, &BlockUpdate::new()).unwrap();
        let err = archive.add(0, &BlockUpdate::new()).unwrap_err();
        assert!(matches!(err, ArchiveError::OutOfOrder { requested: 0, last: 0 }));
    }

    // S6: block 0 is a legal, independently queryable block.
    #[test]
    fn block_zero_balance_is_queryable_at_block_zero() {
        let archive = Archive::new(MemoryBackend::new());
        let a1 = addr(1);

        let mut block0 = BlockUpdate::new();
        block0.created.push(a1);
        block0.balance_updates.push((a1, Balance::from_u64(0x11)));
        archive.add(0, &block0).unwrap();

        let mut block1 = BlockUpdate::new();
        block1.balance_updates.push((a1, Balance::from_u64(0x12)));
        archive.add(1, &block1).unwrap();

        assert!(archive.exists(a1, 0).unwrap());
        assert!(archive.exists(a1, 1).unwrap());
        assert_eq!(archive.get_balance(a1, 0).unwrap(), Balance::from_u64(0x11));
        assert_eq!(archive.get_balance(a1, 1).unwrap(), Balance::from_u64(0x12));
    }

    // P5: two archives fed the same sequence agree on every block hash.
    #[test]
    fn two_archives_given_identical_updates_agree_on_every_hash() {
        let left = Archive::new(MemoryBackend::new());
        let right = Archive::new(MemoryBackend::new());
        let a1 = addr(7);

        for block in [1u64, 2, 5, 5_000] {
            let mut update = BlockUpdate::new();
            if block == 1 {
                update.created.push(a1);
            }
            update.balance_updates.push((a1, Balance::from_u64(block)));
            left.add(block, &update).unwrap();
            right.add(block, &update).unwrap();
        }

        for block in [1u64, 2, 5, 5_000] {
            assert_eq!(left.get_hash(block).unwrap(), right.get_hash(block).unwrap());
        }
    }

    // §4.15/§7: the optional extensions are always declined by this variant.
    #[test]
    fn witness_proof_and_genesis_export_are_always_declined() {
        let archive = Archive::new(MemoryBackend::new());
        assert!(matches!(archive.witness_proof(addr(1), 0), Err(ArchiveError::WitnessProofNotSupported)));
        assert!(matches!(archive.export_genesis(0), Err(ArchiveError::GenesisExportNotSupported)));
    }

    // P6: a backend failure mid-commit leaves no trace of the rejected block.
    #[test]
    fn a_failed_commit_leaves_the_archive_unchanged() {
        let archive = Archive::new(FaultyBackend::new());
        let a1 = addr(3);

        let mut block1 = BlockUpdate::new();
        block1.created.push(a1);
        block1.balance_updates.push((a1, Balance::from_u64(1)));
        archive.add(1, &block1).unwrap();

        archive.backend.fail_next_write();
        let mut block2 = BlockUpdate::new();
        block2.balance_updates.push((a1, Balance::from_u64(2)));
        assert!(archive.add(2, &block2).is_err());

        assert_eq!(archive.block_height().unwrap().unwrap().block, 1);
        assert_eq!(archive.get_balance(a1, 2).unwrap(), Balance::from_u64(1));
    }
}
