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

//! Fixed-width value types shared by every component of the archive.

use primitive_types::{H160, H256, U128};
use std::fmt;

/// Block numbers are unsigned 64-bit and need not be contiguous.
pub type BlockNumber = u64;

/// Arbitrary-length contract code. `None` and `Some(vec![])` are deliberately
/// indistinguishable once written (§9).
pub type Code = Vec<u8>;

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "0x")?;
    for b in bytes {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

macro_rules! hash_like {
    ($name:ident, $inner:ty) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn zero() -> Self {
                Self(<$inner>::zero())
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            pub fn from_bytes(bytes: <$inner as FixedBytes>::Array) -> Self {
                Self(<$inner>::from(bytes))
            }

            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_hex(f, self.0.as_bytes())
            }
        }
    };
}

/// Helper trait so the `hash_like!` macro can name each wrapped type's byte array.
pub trait FixedBytes {
    type Array;
}

impl FixedBytes for H160 {
    type Array = [u8; 20];
}

impl FixedBytes for H256 {
    type Array = [u8; 32];
}

hash_like!(Address, H160);
hash_like!(Hash, H256);

/// A 32-byte storage slot key.
pub type SlotKey = Hash;
/// A 32-byte storage slot value.
pub type SlotValue = Hash;

/// A monotonic per-account counter scoping storage (§3, Reincarnation).
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Reincarnation(pub u32);

impl Reincarnation {
    pub fn next(self) -> Self {
        Reincarnation(self.0 + 1)
    }

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Reincarnation(u32::from_be_bytes(bytes))
    }
}

/// `(exists, reincarnation)` as recorded in the `account_status` table (§3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AccountStatus {
    pub exists: bool,
    pub reincarnation: Reincarnation,
}

impl AccountStatus {
    pub const ABSENT: AccountStatus = AccountStatus {
        exists: false,
        reincarnation: Reincarnation(0),
    };

    pub fn to_bytes(self) -> [u8; 5] {
        let mut buf = [0u8; 5];
        buf[0] = self.exists as u8;
        buf[1..].copy_from_slice(&self.reincarnation.to_be_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), 5, "account_status value must be 5 bytes");
        let mut reinc = [0u8; 4];
        reinc.copy_from_slice(&bytes[1..5]);
        AccountStatus {
            exists: bytes[0] != 0,
            reincarnation: Reincarnation::from_be_bytes(reinc),
        }
    }
}

/// A 16-byte unsigned balance. Hashing always uses the 32-byte canonical
/// big-endian form (§4.3); on-disk storage keeps the compact 16-byte form.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Balance(pub U128);

impl Balance {
    pub fn from_u64(value: u64) -> Self {
        Balance(U128::from(value))
    }

    pub fn to_be_bytes16(self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        self.0.to_big_endian(&mut buf);
        buf
    }

    pub fn from_be_bytes16(bytes: &[u8; 16]) -> Self {
        Balance(U128::from_big_endian(bytes))
    }

    /// The 32-byte big-endian canonical encoding used exclusively for hashing (§4.3).
    pub fn to_canonical_32(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&self.to_be_bytes16());
        out
    }
}

/// An 8-byte account nonce, hashed and stored verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Nonce(pub u64);

impl Nonce {
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: &[u8; 8]) -> Self {
        Nonce(u64::from_be_bytes(*bytes))
    }
}
