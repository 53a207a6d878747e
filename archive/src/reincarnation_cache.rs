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

//! Current reincarnation number per account, memoized across `add` calls
//! (§4.8, C8). Purely a write-path accelerator: ingestion always has to know
//! the live reincarnation to scope new storage writes, and re-deriving it
//! from the backend on every block would mean an extra seek per touched
//! account. Clearing the cache can never change query results, only how
//! many backend seeks a commit takes.

use crate::types::{Address, Reincarnation};
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct ReincarnationCache {
    entries: Mutex<HashMap<Address, Reincarnation>>,
}

impl ReincarnationCache {
    pub fn new() -> Self {
        ReincarnationCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, address: Address) -> Option<Reincarnation> {
        self.entries.lock().get(&address).copied()
    }

    pub fn set(&self, address: Address, reincarnation: Reincarnation) {
        self.entries.lock().insert(address, reincarnation);
    }
}

impl Default for ReincarnationCache {
    fn default() -> Self {
        Self::new()
    }
}
