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

//! Groups a raw [`BlockUpdate`] by account into a deterministic iteration
//! order (§4.2, C2).

use crate::types::{Address, Balance, Code, Nonce, SlotKey, SlotValue};
use crate::update::BlockUpdate;
use std::collections::BTreeMap;

/// Everything that happened to one account within a single block.
#[derive(Clone, Debug, Default)]
pub struct AccountUpdate {
    pub created: bool,
    pub deleted: bool,
    pub balance: Option<Balance>,
    pub nonce: Option<Nonce>,
    pub code: Option<Code>,
    /// Ordered exactly as the slot writes were supplied; not deduplicated (§4.2).
    pub slots: Vec<(SlotKey, SlotValue)>,
}

/// A [`BlockUpdate`] grouped by account and sorted by ascending address.
pub struct NormalizedUpdate {
    pub accounts: Vec<(Address, AccountUpdate)>,
}

/// `Address`'s derived `Ord` compares the inner 20 bytes lexicographically,
/// which is exactly the unsigned ordering §4.2 requires, so a `BTreeMap`
/// gives us both the grouping and the sort in one pass.
pub fn normalize(update: &BlockUpdate) -> NormalizedUpdate {
    let mut accounts: BTreeMap<Address, AccountUpdate> = BTreeMap::new();

    for &address in &update.created {
        accounts.entry(address).or_default().created = true;
    }
    for &address in &update.deleted {
        accounts.entry(address).or_default().deleted = true;
    }
    for &(address, balance) in &update.balance_updates {
        accounts.entry(address).or_default().balance = Some(balance);
    }
    for &(address, nonce) in &update.nonce_updates {
        accounts.entry(address).or_default().nonce = Some(nonce);
    }
    for (address, code) in &update.code_updates {
        accounts.entry(*address).or_default().code = Some(code.clone());
    }
    for slot in &update.slot_updates {
        accounts.entry(slot.address).or_default().slots.push((slot.key, slot.value));
    }

    NormalizedUpdate {
        accounts: accounts.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash;
    use crate::update::SlotUpdate;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn sorts_accounts_ascending_and_preserves_slot_order() {
        let mut update = BlockUpdate::new();
        update.created.push(addr(9));
        update.created.push(addr(1));
        update.slot_updates.push(SlotUpdate {
            address: addr(1),
            key: Hash::from_bytes([1u8; 32]),
            value: Hash::from_bytes([0xaa; 32]),
        });
        update.slot_updates.push(SlotUpdate {
            address: addr(1),
            key: Hash::from_bytes([2u8; 32]),
            value: Hash::from_bytes([0xbb; 32]),
        });

        let normalized = normalize(&update);
        let addrs: Vec<Address> = normalized.accounts.iter().map(|(a, _)| *a).collect();
        assert_eq!(addrs, vec![addr(1), addr(9)]);

        let (_, first) = &normalized.accounts[0];
        assert_eq!(first.slots[0].0, Hash::from_bytes([1u8; 32]));
        assert_eq!(first.slots[1].0, Hash::from_bytes([2u8; 32]));
    }

    #[test]
    fn empty_update_normalizes_to_no_accounts() {
        let update = BlockUpdate::new();
        assert!(normalize(&update).accounts.is_empty());
    }
}
