use crate::key::StateKey;
use alloy_primitives::{Bytes, U256};
use bitflags::bitflags;
use hearth_primitives::Account;

bitflags! {
    /// Per-entry state bits.
    ///
    /// The bits are orthogonal and may combine: `MODIFIED | DELETED` is a
    /// dirty tombstone awaiting commit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct EntryFlags: u16 {
        /// The entry is dirty: it lives in the write queue and is exempt
        /// from eviction until the host commits.
        const MODIFIED = 1 << 0;
        /// The entry records known absence of its key.
        const DELETED = 1 << 1;
    }
}

/// Value payload of a cache entry, one variant per record class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CacheValue {
    /// Account body.
    Account(Account),
    /// Storage slot value.
    Storage(U256),
    /// Contract code.
    Code(Bytes),
}

impl CacheValue {
    /// Copies the value portion from `other`.
    ///
    /// Both values must belong to the same record class; a mismatch means the
    /// caller confused record kinds and is unrecoverable.
    pub(crate) fn copy_from(&mut self, other: &Self) {
        match (self, other) {
            (Self::Account(account), Self::Account(other)) => *account = *other,
            (Self::Storage(value), Self::Storage(other)) => *value = *other,
            (Self::Code(code), Self::Code(other)) => *code = other.clone(),
            (value, other) => panic!("cache value class mismatch: {value:?} <- {other:?}"),
        }
    }

    pub(crate) fn as_account(&self) -> &Account {
        match self {
            Self::Account(account) => account,
            value => panic!("expected an account value, got {value:?}"),
        }
    }

    pub(crate) fn as_storage(&self) -> U256 {
        match self {
            Self::Storage(value) => *value,
            value => panic!("expected a storage value, got {value:?}"),
        }
    }

    pub(crate) fn as_code(&self) -> &Bytes {
        match self {
            Self::Code(code) => code,
            value => panic!("expected a code value, got {value:?}"),
        }
    }

    /// Budget weight of the value.
    ///
    /// Every record currently weighs 1; byte-accurate accounting only needs
    /// to change this.
    pub(crate) const fn size(&self) -> u32 {
        1
    }
}

/// A live cache record: key, value, and the intrusive LRU bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry {
    /// Ordering key; also stored in the indexes.
    pub(crate) key: StateKey,
    pub(crate) value: CacheValue,
    /// Monotonic touch counter value; the LRU ordering key of the queues.
    pub(crate) sequence: u64,
    /// Current position in whichever queue the entry belongs to. Maintained
    /// by the queue on every swap, so that an entry can be re-sifted or
    /// removed in O(log n) given only its arena key.
    pub(crate) queue_pos: usize,
    pub(crate) flags: EntryFlags,
}

impl CacheEntry {
    pub(crate) const fn new(
        key: StateKey,
        value: CacheValue,
        sequence: u64,
        flags: EntryFlags,
    ) -> Self {
        Self { key, value, sequence, queue_pos: 0, flags }
    }

    pub(crate) const fn is_modified(&self) -> bool {
        self.flags.contains(EntryFlags::MODIFIED)
    }

    pub(crate) const fn is_deleted(&self) -> bool {
        self.flags.contains(EntryFlags::DELETED)
    }
}
