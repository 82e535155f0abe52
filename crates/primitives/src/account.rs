use alloy_consensus::constants::KECCAK_EMPTY;
use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// An Ethereum account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Account nonce.
    pub nonce: u64,
    /// Account balance.
    pub balance: U256,
    /// Hash of the account's bytecode.
    pub bytecode_hash: Option<B256>,
}

impl Account {
    /// Whether the account has bytecode.
    pub const fn has_bytecode(&self) -> bool {
        self.bytecode_hash.is_some()
    }

    /// After `SpuriousDragon` an empty account is defined as account with nonce == 0 && balance ==
    /// 0 && bytecode = None (or hash is [`KECCAK_EMPTY`]).
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 &&
            self.balance.is_zero() &&
            self.bytecode_hash.map_or(true, |hash| hash == KECCAK_EMPTY)
    }

    /// Returns an account bytecode's hash.
    /// In case of no bytecode, returns [`KECCAK_EMPTY`].
    pub fn get_bytecode_hash(&self) -> B256 {
        self.bytecode_hash.unwrap_or(KECCAK_EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};

    #[test]
    fn test_empty_account() {
        let mut acc = Account { nonce: 0, balance: U256::ZERO, bytecode_hash: None };
        // Nonce 0, balance 0, and bytecode hash set to None is considered empty.
        assert!(acc.is_empty());

        acc.bytecode_hash = Some(KECCAK_EMPTY);
        // Nonce 0, balance 0, and bytecode hash set to KECCAK_EMPTY is considered empty.
        assert!(acc.is_empty());

        acc.balance = U256::from(2);
        // Non-zero balance makes it non-empty.
        assert!(!acc.is_empty());

        acc.balance = U256::ZERO;
        acc.nonce = 10;
        // Non-zero nonce makes it non-empty.
        assert!(!acc.is_empty());

        acc.nonce = 0;
        acc.bytecode_hash = Some(B256::from(U256::ZERO));
        // Non-empty bytecode hash makes it non-empty.
        assert!(!acc.is_empty());
    }

    #[test]
    fn test_bytecode_hash() {
        let acc = Account::default();
        assert!(!acc.has_bytecode());
        assert_eq!(acc.get_bytecode_hash(), KECCAK_EMPTY);

        let hash = B256::repeat_byte(0x42);
        let acc = Account { nonce: 1, balance: U256::ZERO, bytecode_hash: Some(hash) };
        assert!(acc.has_bytecode());
        assert_eq!(acc.get_bytecode_hash(), hash);
    }

    #[test]
    fn test_account_serde() {
        let acc = Account {
            nonce: 2,
            balance: U256::from(1000),
            bytecode_hash: Some(B256::repeat_byte(0x11)),
        };
        let encoded = serde_json::to_string(&acc).unwrap();
        let decoded: Account = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, acc);
    }
}
