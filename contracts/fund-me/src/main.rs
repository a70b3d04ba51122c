//! FundMe Ledger - Charms App Entry Point
//!
//! Validates contributions and owner withdrawals against the ledger charm.
//!
//! ## Operations Validated
//!
//! - `Fund`: credit a contribution worth at least the USD minimum
//! - `Withdraw`: owner drains the ledger, funders indexed one by one
//! - `CheaperWithdraw`: owner drains the ledger, funders read once
//!
//! ## UTXO Model
//!
//! ```text
//! INPUTS                    OUTPUTS
//! ├─ Ledger charm    ────► ├─ Ledger charm (updated)
//! └─ Coins (Fund)          └─ Coins to owner (Withdraw)
//! REFS
//! └─ Price feed charm
//! ```

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for ledger operations.
///
/// # Arguments
/// * `app` - The ledger app definition
/// * `tx` - The transaction being validated
/// * `x` - Public inputs
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    fundme_ledger::charms::validate_ledger_operation(app, tx, x, w)
}

charms_sdk::main!(app_contract);
