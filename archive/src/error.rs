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

use crate::types::BlockNumber;
use thiserror::Error;

/// Opaque substrate failure (I/O, disk full, unique-constraint, iterator error).
/// The archive never inspects the cause; it only propagates it (§7).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub Box<dyn std::error::Error + Send + Sync>);

impl BackendError {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        BackendError(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Ingestion monotonicity violated: `requested_block <= last_block` (§3 I1).
    #[error("block {requested} is out of order: archive tip is already at block {last}")]
    OutOfOrder {
        requested: BlockNumber,
        last: BlockNumber,
    },

    /// Any substrate failure (§7).
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Sentinel for archive variants that do not implement witness proofs (§7).
    #[error("witness proofs are not supported by this archive")]
    WitnessProofNotSupported,

    /// Sentinel for archive variants that do not implement genesis export (§7).
    #[error("genesis export is not supported by this archive")]
    GenesisExportNotSupported,
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
