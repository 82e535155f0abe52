use crate::{
    config::StateCacheConfig,
    entry::{CacheEntry, CacheValue, EntryFlags},
    key::StateKey,
    queue::LruQueues,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use hearth_primitives::Account;
use slab::Slab;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Outcome of a cache lookup.
///
/// A tombstone is as much of a hit as a value: the backend is known to hold
/// nothing for the key and the host must not fall through to storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The key is cached with a value.
    Found(T),
    /// The key is cached as known-absent.
    Absent,
    /// The key is not in the cache. The host should consult the backend and
    /// report the result back via the matching `set_*_read` / `set_*_absent`.
    Miss,
}

impl<T> Lookup<T> {
    /// Returns the cached value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the key is not in the cache at all.
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    /// Whether the key is cached as known-absent.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Maps the found value, passing the other outcomes through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Absent => Lookup::Absent,
            Self::Miss => Lookup::Miss,
        }
    }
}

/// One cached record, yielded by the in-order walks in key order.
///
/// A `None` payload is a tombstone: the key is known to be absent from the
/// backend, or is staged for deletion when yielded by
/// [`StateCache::iter_writes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange<'a> {
    /// An account record.
    Account {
        /// Account address.
        address: Address,
        /// Account body, `None` for a tombstone.
        account: Option<&'a Account>,
    },
    /// A storage slot.
    Storage {
        /// Account the slot belongs to.
        address: Address,
        /// Storage generation of the account.
        incarnation: u64,
        /// Location of the slot.
        location: B256,
        /// Slot value, `None` for a tombstone.
        value: Option<U256>,
    },
    /// Contract code.
    Code {
        /// Account address.
        address: Address,
        /// Code bytes, `None` for a tombstone.
        code: Option<&'a Bytes>,
    },
}

impl StateChange<'_> {
    /// The address the record belongs to.
    pub const fn address(&self) -> Address {
        match *self {
            Self::Account { address, .. } |
            Self::Storage { address, .. } |
            Self::Code { address, .. } => address,
        }
    }

    /// Whether the record is a tombstone.
    pub const fn is_absent(&self) -> bool {
        matches!(
            self,
            Self::Account { account: None, .. } |
                Self::Storage { value: None, .. } |
                Self::Code { code: None, .. }
        )
    }
}

fn change_for<'a>(key: &StateKey, entry: &'a CacheEntry) -> StateChange<'a> {
    let absent = entry.is_deleted();
    match (*key, &entry.value) {
        (StateKey::Account(address), CacheValue::Account(account)) => {
            StateChange::Account { address, account: (!absent).then_some(account) }
        }
        (StateKey::Storage { address, incarnation, location }, CacheValue::Storage(value)) => {
            StateChange::Storage { address, incarnation, location, value: (!absent).then_some(*value) }
        }
        (StateKey::Code(address), CacheValue::Code(code)) => {
            StateChange::Code { address, code: (!absent).then_some(code) }
        }
        (key, value) => panic!("cache key/value class mismatch: {key:?} / {value:?}"),
    }
}

/// Layered LRU cache over world-state reads and pending writes.
///
/// Entries live in one ordered view and in one of two LRU queues sharing a
/// fixed backing array:
///
/// * *Read* entries are speculative copies of backend state. They are
///   evicted least-recently-inserted-first whenever the read budget, or the
///   combined budget, is exceeded.
/// * *Write* entries are dirty and pinned: they are never evicted, and
///   exceeding the write budget is a caller error ([`Self::set_account_write`]
///   and friends panic; commit first). After persisting,
///   [`Self::turn_writes_to_reads`] demotes all of them to clean reads in one
///   batch.
///
/// Lookups never touch the LRU order: the eviction order is by the last
/// *insertion or write* of an entry, not the last read of it. Block-execution
/// workloads re-read the same keys heavily, and re-sorting the queue on every
/// hit would churn without improving the hit rate.
///
/// The cache does no locking and no I/O; the caller provides exclusive
/// access, and every operation completes synchronously.
#[derive(Debug)]
pub struct StateCache {
    /// Arena owning every live entry. The queues and the indexes refer to
    /// entries by arena key.
    entries: Slab<CacheEntry>,
    /// Every live entry, clean and dirty, in key order.
    read_writes: BTreeMap<StateKey, usize>,
    /// The dirty subset, in key order. Walked at commit time.
    writes: BTreeMap<StateKey, usize>,
    queues: LruQueues,
    limit_reads: usize,
    limit_writes: usize,
    sequence: u64,
}

impl StateCache {
    /// Creates a cache with the given read and write entry budgets.
    ///
    /// The backing queue array is sized to `limit_reads + limit_writes` once,
    /// up front; the cache never reallocates it.
    pub fn new(limit_reads: usize, limit_writes: usize) -> Self {
        let capacity = limit_reads + limit_writes;
        Self {
            entries: Slab::with_capacity(capacity),
            read_writes: BTreeMap::new(),
            writes: BTreeMap::new(),
            queues: LruQueues::new(capacity),
            limit_reads,
            limit_writes,
            sequence: 0,
        }
    }

    /// Creates a cache from a [`StateCacheConfig`].
    pub fn with_config(config: StateCacheConfig) -> Self {
        Self::new(config.limit_reads, config.limit_writes)
    }

    /// Number of clean read entries currently cached.
    pub fn read_count(&self) -> usize {
        self.queues.read_len()
    }

    /// Number of dirty entries staged for the next commit.
    pub fn write_count(&self) -> usize {
        self.queues.write_len()
    }

    /// Total number of live entries, clean and dirty.
    pub fn len(&self) -> usize {
        self.read_writes.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read_writes.is_empty()
    }

    /// The read entry budget.
    pub const fn limit_reads(&self) -> usize {
        self.limit_reads
    }

    /// The write entry budget.
    pub const fn limit_writes(&self) -> usize {
        self.limit_writes
    }

    /// The shared capacity of the two queues.
    pub fn capacity(&self) -> usize {
        self.queues.capacity()
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    fn lookup(&self, key: &StateKey) -> Lookup<&CacheEntry> {
        match self.read_writes.get(key) {
            Some(&id) => {
                let entry = &self.entries[id];
                if entry.is_deleted() {
                    Lookup::Absent
                } else {
                    Lookup::Found(entry)
                }
            }
            None => Lookup::Miss,
        }
    }

    /// Looks up the account with the given address.
    ///
    /// Lookups are read-only for LRU purposes: neither the sequence nor the
    /// queue position of the entry changes.
    pub fn get_account(&self, address: Address) -> Lookup<Account> {
        self.lookup(&StateKey::Account(address)).map(|entry| *entry.value.as_account())
    }

    /// Looks up the storage slot `(address, incarnation, location)`.
    pub fn get_storage(&self, address: Address, incarnation: u64, location: B256) -> Lookup<U256> {
        self.lookup(&StateKey::Storage { address, incarnation, location })
            .map(|entry| entry.value.as_storage())
    }

    /// Looks up the contract code of the given address.
    pub fn get_code(&self, address: Address) -> Lookup<Bytes> {
        self.lookup(&StateKey::Code(address)).map(|entry| entry.value.as_code().clone())
    }

    /// Inserts a clean read entry, evicting the least recently touched read
    /// if the read budget or the shared capacity is exhausted.
    ///
    /// The key must not be cached yet: the caller is expected to `get` first
    /// and only report backend results for misses.
    fn set_read(&mut self, key: StateKey, value: CacheValue, flags: EntryFlags) {
        assert!(
            !self.read_writes.contains_key(&key),
            "{key:?} is already cached; reads may only fill lookup misses"
        );
        if self.limit_reads == 0 {
            return;
        }
        let sequence = self.next_sequence();
        let id = self.entries.insert(CacheEntry::new(key, value, sequence, flags));
        if self.queues.read_len() >= self.limit_reads || self.queues.is_full() {
            // Upgrades can pin the entire array with writes, leaving nothing
            // to evict; caching reads again requires a commit first.
            assert!(
                self.queues.read_len() > 0,
                "capacity exhausted by pinned writes; commit writes before caching reads"
            );
            let evicted = self.queues.read_replace_min(&mut self.entries, id);
            let evicted = self.entries.remove(evicted);
            self.read_writes.remove(&evicted.key);
            trace!(
                target: "state::cache",
                key = ?evicted.key,
                sequence = evicted.sequence,
                weight = evicted.value.size(),
                "evicted read entry"
            );
        } else {
            self.queues.read_push(&mut self.entries, id);
        }
        self.read_writes.insert(key, id);
    }

    /// Inserts or updates a dirty entry.
    ///
    /// Same-key tie-break, in order: an already dirty entry is updated in
    /// place; a clean read is upgraded in place (its allocation moves from
    /// the read queue to the write queue); otherwise a fresh entry is
    /// admitted, evicting the least recently touched read when the shared
    /// capacity is exhausted.
    fn set_write(&mut self, key: StateKey, value: CacheValue, flags: EntryFlags) {
        debug_assert!(flags.contains(EntryFlags::MODIFIED));
        if let Some(&id) = self.writes.get(&key) {
            let sequence = self.next_sequence();
            let entry = &mut self.entries[id];
            entry.value.copy_from(&value);
            entry.sequence = sequence;
            entry.flags = flags;
            let pos = entry.queue_pos;
            self.queues.write_fix(&mut self.entries, pos);
            return;
        }
        if let Some(&id) = self.read_writes.get(&key) {
            let sequence = self.next_sequence();
            let entry = &mut self.entries[id];
            entry.value.copy_from(&value);
            entry.sequence = sequence;
            entry.flags = flags;
            let pos = entry.queue_pos;
            self.queues.read_remove(&mut self.entries, pos);
            self.queues.write_push(&mut self.entries, id);
            self.writes.insert(key, id);
            return;
        }
        assert!(
            self.queues.write_len() < self.limit_writes,
            "write budget ({}) exhausted; commit writes before staging more",
            self.limit_writes
        );
        if self.queues.is_full() {
            let evicted = self.queues.read_pop(&mut self.entries);
            let evicted = self.entries.remove(evicted);
            self.read_writes.remove(&evicted.key);
            trace!(
                target: "state::cache",
                key = ?evicted.key,
                sequence = evicted.sequence,
                weight = evicted.value.size(),
                "evicted read entry to admit a write"
            );
        }
        let sequence = self.next_sequence();
        let id = self.entries.insert(CacheEntry::new(key, value, sequence, flags));
        self.queues.write_push(&mut self.entries, id);
        self.read_writes.insert(key, id);
        self.writes.insert(key, id);
    }

    /// Caches an account read from the backend.
    pub fn set_account_read(&mut self, address: Address, account: Account) {
        self.set_read(StateKey::Account(address), CacheValue::Account(account), EntryFlags::empty());
    }

    /// Caches the known absence of an account.
    pub fn set_account_absent(&mut self, address: Address) {
        self.set_read(
            StateKey::Account(address),
            CacheValue::Account(Account::default()),
            EntryFlags::DELETED,
        );
    }

    /// Stages an account write. The entry is pinned until
    /// [`Self::turn_writes_to_reads`].
    pub fn set_account_write(&mut self, address: Address, account: Account) {
        self.set_write(StateKey::Account(address), CacheValue::Account(account), EntryFlags::MODIFIED);
    }

    /// Stages an account deletion.
    pub fn set_account_delete(&mut self, address: Address) {
        self.set_write(
            StateKey::Account(address),
            CacheValue::Account(Account::default()),
            EntryFlags::MODIFIED | EntryFlags::DELETED,
        );
    }

    /// Caches a storage slot read from the backend.
    pub fn set_storage_read(
        &mut self,
        address: Address,
        incarnation: u64,
        location: B256,
        value: U256,
    ) {
        self.set_read(
            StateKey::Storage { address, incarnation, location },
            CacheValue::Storage(value),
            EntryFlags::empty(),
        );
    }

    /// Caches the known absence of a storage slot.
    pub fn set_storage_absent(&mut self, address: Address, incarnation: u64, location: B256) {
        self.set_read(
            StateKey::Storage { address, incarnation, location },
            CacheValue::Storage(U256::ZERO),
            EntryFlags::DELETED,
        );
    }

    /// Stages a storage slot write.
    pub fn set_storage_write(
        &mut self,
        address: Address,
        incarnation: u64,
        location: B256,
        value: U256,
    ) {
        self.set_write(
            StateKey::Storage { address, incarnation, location },
            CacheValue::Storage(value),
            EntryFlags::MODIFIED,
        );
    }

    /// Stages a storage slot deletion.
    pub fn set_storage_delete(&mut self, address: Address, incarnation: u64, location: B256) {
        self.set_write(
            StateKey::Storage { address, incarnation, location },
            CacheValue::Storage(U256::ZERO),
            EntryFlags::MODIFIED | EntryFlags::DELETED,
        );
    }

    /// Caches contract code read from the backend.
    pub fn set_code_read(&mut self, address: Address, code: Bytes) {
        self.set_read(StateKey::Code(address), CacheValue::Code(code), EntryFlags::empty());
    }

    /// Caches the known absence of contract code.
    pub fn set_code_absent(&mut self, address: Address) {
        self.set_read(StateKey::Code(address), CacheValue::Code(Bytes::new()), EntryFlags::DELETED);
    }

    /// Stages a contract code write.
    pub fn set_code_write(&mut self, address: Address, code: Bytes) {
        self.set_write(StateKey::Code(address), CacheValue::Code(code), EntryFlags::MODIFIED);
    }

    /// Stages a contract code deletion.
    pub fn set_code_delete(&mut self, address: Address) {
        self.set_write(
            StateKey::Code(address),
            CacheValue::Code(Bytes::new()),
            EntryFlags::MODIFIED | EntryFlags::DELETED,
        );
    }

    /// In-order walk over every cached record, clean and dirty.
    pub fn iter(&self) -> impl Iterator<Item = StateChange<'_>> + '_ {
        self.read_writes.iter().map(|(key, &id)| change_for(key, &self.entries[id]))
    }

    /// In-order walk starting at `start` (inclusive).
    ///
    /// Because an account sorts before its code and its code before its
    /// storage slots, starting at [`StateKey::Account`] walks the whole
    /// neighborhood of that address contiguously.
    pub fn iter_from(&self, start: StateKey) -> impl Iterator<Item = StateChange<'_>> + '_ {
        self.read_writes.range(start..).map(|(key, &id)| change_for(key, &self.entries[id]))
    }

    /// In-order walk over the dirty records pending commit.
    ///
    /// The host persists these, in this order, then calls
    /// [`Self::turn_writes_to_reads`].
    pub fn iter_writes(&self) -> impl Iterator<Item = StateChange<'_>> + '_ {
        self.writes.iter().map(|(key, &id)| change_for(key, &self.entries[id]))
    }

    /// Demotes every dirty entry to a clean read after a successful persist.
    ///
    /// Clears the dirty flag on all staged entries, appends the write queue
    /// region to the read queue region in one move, and rebuilds the read
    /// heap bottom-up — O(reads + writes) overall. The entries themselves
    /// stay cached; they merely become evictable.
    pub fn turn_writes_to_reads(&mut self) {
        if self.writes.is_empty() {
            debug_assert_eq!(self.queues.write_len(), 0);
            return;
        }
        for &id in self.writes.values() {
            self.entries[id].flags.remove(EntryFlags::MODIFIED);
        }
        let demoted = self.writes.len();
        self.writes.clear();
        self.queues.merge_writes(&mut self.entries);
        debug!(target: "state::cache", demoted, "turned writes into reads");
    }
}

#[cfg(test)]
impl StateCache {
    /// Audits every cross-structure invariant. Test-only.
    fn assert_consistent(&self) {
        assert_eq!(self.read_writes.len(), self.queues.total_len());
        assert_eq!(self.read_writes.len(), self.entries.len());
        // Neither region is hard-bounded by its own budget alone: demoted
        // writes overflow the read region after a commit, and upgrades of
        // clean reads bypass the write budget. The shared capacity is the
        // hard bound.
        assert!(self.queues.total_len() <= self.queues.capacity());
        assert_eq!(self.writes.len(), self.queues.write_len());
        for (key, &id) in &self.read_writes {
            let entry = &self.entries[id];
            assert_eq!(entry.key, *key);
            assert_eq!(self.writes.contains_key(key), entry.is_modified());
        }
        for id in self.queues.read_ids() {
            assert!(!self.entries[id].is_modified());
        }
        for id in self.queues.write_ids() {
            assert!(self.entries[id].is_modified());
        }
        self.queues.assert_consistent(&self.entries);
    }
}
