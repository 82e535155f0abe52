//! Primitive value types shared across the hearth workspace.
//!
//! Re-exports the [`alloy_primitives`] types used throughout so that
//! downstream crates have a single import path.

#![doc(issue_tracker_base_url = "https://github.com/hearth-eth/hearth/issues/")]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod account;
pub use account::Account;

pub use alloy_consensus::constants::KECCAK_EMPTY;
pub use alloy_primitives::{Address, Bytes, B256, U256};
