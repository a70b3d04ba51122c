//! Core Types for the FundMe Ledger
//!
//! Data structures shared by the ledger, the price feed and their
//! state-transition validators.

use crate::{BTreeMap, Vec};
use crate::errors::{FundMeError, FundMeResult};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// The all-zero address, never a valid owner
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Ledger Types ============

/// Complete bookkeeping of a FundMe ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerState {
    /// Deployer, the only identity allowed to withdraw
    pub owner: Address,
    /// Address of the price feed consulted on every contribution
    pub price_feed: Address,
    /// Cumulative contribution per funder (native base units)
    pub address_to_amount: BTreeMap<Address, u128>,
    /// Every contribution event in arrival order; repeat funders appear repeatedly
    pub funders: Vec<Address>,
    /// Native value held by the ledger
    pub balance: u128,
}

impl LedgerState {
    /// Creates an empty ledger owned by `owner`
    pub fn new(owner: Address, price_feed: Address) -> Self {
        Self {
            owner,
            price_feed,
            address_to_amount: BTreeMap::new(),
            funders: Vec::new(),
            balance: 0,
        }
    }

    /// Cumulative amount contributed by `funder` (0 if never funded)
    pub fn amount_of(&self, funder: &Address) -> u128 {
        self.address_to_amount.get(funder).copied().unwrap_or(0)
    }

    /// Funder recorded at `index` of the funder sequence
    pub fn funder_at(&self, index: usize) -> FundMeResult<Address> {
        self.funders.get(index).copied().ok_or(FundMeError::IndexOutOfRange {
            index,
            len: self.funders.len(),
        })
    }

    /// Returns true if nothing is owed to anyone and nothing is held
    pub fn is_settled(&self) -> bool {
        self.funders.is_empty() && self.address_to_amount.is_empty() && self.balance == 0
    }

    /// Serialize state to bytes for snapshots
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize state from snapshot bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Which iteration strategy cleared the ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum WithdrawStrategy {
    /// Indexes the stored funder sequence on every step
    Standard,
    /// Moves the funder sequence into a local copy once
    Cheaper,
}

/// Ledger actions (mutating surface)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FundMeAction {
    /// Contribute the attached native value
    Fund { amount: u128 },
    /// Owner withdraws everything, standard iteration
    Withdraw,
    /// Owner withdraws everything, single-read iteration
    CheaperWithdraw,
}

// ============ Price Feed Types ============

/// One aggregator round, as reported by `latestRoundData`
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct RoundData {
    /// Round identifier
    pub round_id: u64,
    /// Price answer with feed decimals; signed as published by aggregators
    pub answer: i128,
    /// Timestamp the round started
    pub started_at: u64,
    /// Timestamp the answer was last updated (0 = round incomplete)
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

/// Price feed actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FeedAction {
    /// Create the feed
    Initialize {
        admin: Address,
        operator: Address,
        decimals: u8,
        initial_answer: i128,
    },
    /// Publish a new answer as the next round
    UpdateAnswer { answer: i128, timestamp: u64 },
    /// Publish an answer for an explicit round
    UpdateRoundData {
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    },
    /// Change the operator allowed to publish answers
    SetOperator { operator: Address },
    /// Switch the feed on or off
    SetActive { active: bool },
}

// ============ Identity Helpers ============

/// Derive a deterministic address from a human-readable label
pub fn derive_address(label: &str) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"fundme:account:");
    hasher.update(label.as_bytes());
    let mut address = [0u8; 32];
    address.copy_from_slice(&hasher.finalize());
    address
}

/// Derive the address of a contract deployed by `deployer` at `nonce`
pub fn derive_contract_address(deployer: &Address, nonce: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"fundme:contract:");
    hasher.update(deployer);
    hasher.update(nonce.to_le_bytes());
    let mut address = [0u8; 32];
    address.copy_from_slice(&hasher.finalize());
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_is_settled() {
        let state = LedgerState::new([1u8; 32], [2u8; 32]);
        assert!(state.is_settled());
        assert_eq!(state.amount_of(&[3u8; 32]), 0);
    }

    #[test]
    fn test_funder_at_out_of_range() {
        let mut state = LedgerState::new([1u8; 32], [2u8; 32]);
        state.funders.push([3u8; 32]);

        assert_eq!(state.funder_at(0), Ok([3u8; 32]));
        assert_eq!(
            state.funder_at(1),
            Err(FundMeError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_state_snapshot() {
        let mut state = LedgerState::new([1u8; 32], [2u8; 32]);
        state.address_to_amount.insert([3u8; 32], 42);
        state.funders.push([3u8; 32]);
        state.funders.push([3u8; 32]);
        state.balance = 42;

        let restored = LedgerState::from_bytes(&state.to_bytes()).unwrap();
        assert_eq!(restored, state);
        assert!(LedgerState::from_bytes(&[0xff]).is_none());
    }

    #[test]
    fn test_derived_addresses_are_distinct() {
        let alice = derive_address("alice");
        assert_eq!(alice, derive_address("alice"));
        assert_ne!(alice, derive_address("bob"));

        let first = derive_contract_address(&alice, 0);
        let second = derive_contract_address(&alice, 1);
        assert_ne!(first, second);
        assert_ne!(first, alice);
    }
}
