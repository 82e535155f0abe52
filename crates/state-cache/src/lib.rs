//! Layered LRU cache for Ethereum-style world state.
//!
//! [`StateCache`] holds three kinds of records — account bodies, contract
//! code, and storage slots — behind one ordered key space ([`StateKey`]), so
//! that a single in-order walk yields an address's account, then its code,
//! then its storage slots. Entries are either *reads* (speculatively cached,
//! evictable) or *writes* (dirty, pinned until the host persists them), with
//! independent budgets for each side.
//!
//! The host drives the commit cycle: stage mutations with the `set_*_write` /
//! `set_*_delete` operations, persist them by walking
//! [`StateCache::iter_writes`], then demote everything to clean reads with
//! [`StateCache::turn_writes_to_reads`].
//!
//! ```
//! use hearth_primitives::{Account, Address};
//! use hearth_state_cache::{Lookup, StateCache};
//!
//! let mut cache = StateCache::new(1024, 256);
//! let address = Address::with_last_byte(1);
//!
//! // Backend miss gets reported back to the cache by the host.
//! assert_eq!(cache.get_account(address), Lookup::Miss);
//! cache.set_account_read(address, Account { nonce: 1, ..Default::default() });
//!
//! // Staged write, visible immediately, pinned until commit.
//! cache.set_account_write(address, Account { nonce: 2, ..Default::default() });
//! assert_eq!(cache.get_account(address).found().unwrap().nonce, 2);
//!
//! // Host persists the dirty entries in key order, then demotes them.
//! let staged: Vec<_> = cache.iter_writes().collect();
//! assert_eq!(staged.len(), 1);
//! cache.turn_writes_to_reads();
//! assert_eq!(cache.write_count(), 0);
//! ```

#![doc(issue_tracker_base_url = "https://github.com/hearth-eth/hearth/issues/")]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod cache;
mod config;
mod entry;
mod key;
mod queue;

pub use cache::{Lookup, StateCache, StateChange};
pub use config::{StateCacheConfig, DEFAULT_LIMIT_READS, DEFAULT_LIMIT_WRITES};
pub use key::StateKey;
