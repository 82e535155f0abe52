use alloy_primitives::{Address, B256};
use std::cmp::Ordering;

/// Key of a cached state record.
///
/// All three record classes share one ordered key space so that an in-order
/// walk over the cache yields an address's account record, then its code,
/// then its storage slots, before moving on to the next address:
///
/// 1. addresses compare lexicographically,
/// 2. at the same address the class decides: `Account < Code < Storage`,
/// 3. storage slots of the same address compare by `(incarnation, location)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// The account record of an address.
    Account(Address),
    /// The contract code of an address.
    Code(Address),
    /// A single storage slot.
    Storage {
        /// Account the slot belongs to.
        address: Address,
        /// Storage generation of the account, bumped when the account is
        /// self-destructed and re-created.
        incarnation: u64,
        /// Location of the slot within the account's storage.
        location: B256,
    },
}

impl StateKey {
    /// The address component of the key.
    pub const fn address(&self) -> Address {
        match *self {
            Self::Account(address) | Self::Code(address) => address,
            Self::Storage { address, .. } => address,
        }
    }

    /// Rank of the record class at the same address.
    const fn class_rank(&self) -> u8 {
        match self {
            Self::Account(_) => 0,
            Self::Code(_) => 1,
            Self::Storage { .. } => 2,
        }
    }
}

impl Ord for StateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address()
            .cmp(&other.address())
            .then_with(|| self.class_rank().cmp(&other.class_rank()))
            .then_with(|| match (self, other) {
                (
                    Self::Storage { incarnation, location, .. },
                    Self::Storage { incarnation: other_incarnation, location: other_location, .. },
                ) => incarnation
                    .cmp(other_incarnation)
                    .then_with(|| location.cmp(other_location)),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for StateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(address: Address, incarnation: u64, location: B256) -> StateKey {
        StateKey::Storage { address, incarnation, location }
    }

    #[test]
    fn address_is_the_primary_key() {
        let lo = Address::with_last_byte(1);
        let hi = Address::with_last_byte(2);
        // Any class of a lower address sorts before any class of a higher one.
        assert!(storage(lo, u64::MAX, B256::repeat_byte(0xff)) < StateKey::Account(hi));
        assert!(StateKey::Code(lo) < StateKey::Account(hi));
    }

    #[test]
    fn classes_order_within_one_address() {
        let address = Address::with_last_byte(7);
        let account = StateKey::Account(address);
        let code = StateKey::Code(address);
        let slot = storage(address, 1, B256::ZERO);
        assert!(account < code);
        assert!(code < slot);
        assert!(account < slot);
    }

    #[test]
    fn storage_orders_by_incarnation_then_location() {
        let address = Address::with_last_byte(7);
        assert!(
            storage(address, 1, B256::repeat_byte(0xff)) < storage(address, 2, B256::ZERO),
            "incarnation dominates location"
        );
        assert!(storage(address, 1, B256::repeat_byte(1)) < storage(address, 1, B256::repeat_byte(2)));
        assert_eq!(
            storage(address, 1, B256::ZERO).cmp(&storage(address, 1, B256::ZERO)),
            Ordering::Equal
        );
    }

    #[test]
    fn neighborhood_is_contiguous() {
        let address = Address::with_last_byte(5);
        let next = Address::with_last_byte(6);
        let mut keys = vec![
            StateKey::Account(next),
            storage(address, 2, B256::ZERO),
            StateKey::Code(address),
            storage(address, 1, B256::repeat_byte(3)),
            storage(address, 1, B256::repeat_byte(1)),
            StateKey::Account(address),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                StateKey::Account(address),
                StateKey::Code(address),
                storage(address, 1, B256::repeat_byte(1)),
                storage(address, 1, B256::repeat_byte(3)),
                storage(address, 2, B256::ZERO),
                StateKey::Account(next),
            ]
        );
    }
}
