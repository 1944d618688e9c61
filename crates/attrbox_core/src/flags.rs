//! Container flags and their two-byte wire form.
//!
//! `flags[0]`: bits 0-1 storage mode (0 = contiguous buffer, 1 = linked list),
//! bit 2 readonly. `flags[1]` is reserved and written as zero.

use crate::consts::FLAGS_SIZE;
use crate::errors::{AttrError, Result};

const STORAGE_MASK: u8 = 0b0000_0011;
const READONLY_SHIFT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Buffer,
    /// Reserved. Never produced; envelopes carrying it are rejected.
    LinkedList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub storage: StorageMode,
    pub readonly: bool,
}

impl Flags {
    pub const fn mutable() -> Self {
        Self { storage: StorageMode::Buffer, readonly: false }
    }

    pub const fn constant() -> Self {
        Self { storage: StorageMode::Buffer, readonly: true }
    }

    pub fn to_wire(self) -> [u8; FLAGS_SIZE] {
        let mode = match self.storage {
            StorageMode::Buffer => 0,
            StorageMode::LinkedList => 1,
        };
        [mode | (u8::from(self.readonly) << READONLY_SHIFT), 0]
    }

    /// Unpacks the flag bytes. Mode 3 is not assigned and fails with `Unsupported`.
    pub fn from_wire(raw: [u8; FLAGS_SIZE]) -> Result<Self> {
        let storage = match raw[0] & STORAGE_MASK {
            0 => StorageMode::Buffer,
            1 => StorageMode::LinkedList,
            _ => return Err(AttrError::Unsupported),
        };
        let readonly = (raw[0] >> READONLY_SHIFT) & 1 == 1;
        Ok(Self { storage, readonly })
    }
}
