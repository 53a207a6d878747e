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

//! A block-indexed historical state archive: records account existence,
//! balance, nonce, code and storage at every committed block height and
//! answers "what was the state at or before block B" queries against that
//! history (§1).
//!
//! The archive itself is backend-agnostic; it speaks to storage only through
//! [`BackendAdapter`]. See the sibling `archive-rocksdb` and `archive-sql`
//! crates for concrete backends.

#[macro_use]
extern crate log;
#[macro_use]
extern crate archive_logger;

mod account_hash_cache;
mod archive;
mod backend;
mod codec;
mod error;
mod hash;
mod height;
mod ingest;
#[cfg(test)]
mod memory;
mod normalize;
mod query;
mod reincarnation_cache;
mod types;
mod update;

pub use archive::{Archive, BlockHeight};
pub use backend::{Batch, BatchOp, BackendAdapter, Key, Value};
pub use error::{ArchiveError, BackendError, Result};
pub use types::{Address, AccountStatus, Balance, BlockNumber, Code, Hash, Nonce, Reincarnation, SlotKey, SlotValue};
pub use update::{BlockUpdate, SlotUpdate};
