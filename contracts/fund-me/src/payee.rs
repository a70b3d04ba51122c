//! Value Transfer Recipients
//!
//! A withdrawal hands the drained balance to a [`Payee`]. The payee sees the
//! ledger as it stands after settlement and may refuse the value, in which
//! case the ledger rolls the withdrawal back.

use std::collections::{BTreeMap, BTreeSet};

use fundme_common::types::{Address, LedgerState};

/// Receives native value leaving the ledger
pub trait Payee {
    /// Credit `amount` to `to`; return false to refuse the transfer
    fn receive(&mut self, to: &Address, amount: u128, ledger: &LedgerState) -> bool;
}

impl<F> Payee for F
where
    F: FnMut(&Address, u128, &LedgerState) -> bool,
{
    fn receive(&mut self, to: &Address, amount: u128, ledger: &LedgerState) -> bool {
        self(to, amount, ledger)
    }
}

/// In-memory native balances for accounts outside the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBook {
    balances: BTreeMap<Address, u128>,
    rejecting: BTreeSet<Address>,
}

impl AccountBook {
    /// Empty book where every account accepts value
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `account`; false on overflow
    pub fn credit(&mut self, account: &Address, amount: u128) -> bool {
        let balance = self.balances.entry(*account).or_insert(0);
        match balance.checked_add(amount) {
            Some(total) => {
                *balance = total;
                true
            }
            None => false,
        }
    }

    /// Native balance of `account`, 0 if never credited
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Make `account` refuse incoming value
    pub fn reject(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    /// Make `account` accept incoming value again
    pub fn accept(&mut self, account: Address) {
        self.rejecting.remove(&account);
    }
}

impl Payee for AccountBook {
    fn receive(&mut self, to: &Address, amount: u128, _ledger: &LedgerState) -> bool {
        if self.rejecting.contains(to) {
            return false;
        }
        self.credit(to, amount)
    }
}
