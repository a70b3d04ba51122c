//! FundMe Price Feed - Charms App Entry Point
//!
//! Validates price feed operations on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **UpdateAnswer / UpdateRoundData**: Operator publishes a new ETH/USD round
//! - **SetOperator / SetActive**: Admin manages the feed
//!
//! The feed charm is a **reference data source**: the ledger references it
//! without spending it, and only the operator spends and recreates it.

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for price feed operations.
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    fundme_price_feed::charms::validate_feed_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
