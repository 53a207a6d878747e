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

//! The raw per-block mutation set handed to [`crate::Archive::add`] (§3).

use crate::types::{Address, Balance, Code, Nonce, SlotKey, SlotValue};

/// A single `(slot, value)` write, ordered exactly as supplied by the caller.
/// The source does not deduplicate repeated writes to the same slot within a
/// block; neither does the archive (§4.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotUpdate {
    pub address: Address,
    pub key: SlotKey,
    pub value: SlotValue,
}

/// The full set of logical mutations a block applies to account state (§3).
#[derive(Clone, Debug, Default)]
pub struct BlockUpdate {
    pub created: Vec<Address>,
    pub deleted: Vec<Address>,
    pub balance_updates: Vec<(Address, Balance)>,
    pub nonce_updates: Vec<(Address, Nonce)>,
    pub code_updates: Vec<(Address, Code)>,
    pub slot_updates: Vec<SlotUpdate>,
}

impl BlockUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update is empty iff all six collections are empty (§3).
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.deleted.is_empty()
            && self.balance_updates.is_empty()
            && self.nonce_updates.is_empty()
            && self.code_updates.is_empty()
            && self.slot_updates.is_empty()
    }
}
