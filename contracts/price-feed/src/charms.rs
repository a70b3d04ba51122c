//! Charms SDK Integration for the FundMe Price Feed
//!
//! This module bridges the Charms SDK types with the internal feed
//! validation logic.
//!
//! ## UTXO Transformation Model
//!
//! ```text
//! UpdateAnswer (by operator):
//!   IN:  [Feed state charm]
//!   OUT: [Feed state charm (new round)]
//!
//! Ledger contribution reading the price:
//!   REFS: [Feed state charm]  <- Not consumed, just referenced
//!   IN:   [Ledger state charm]
//!   OUT:  [Ledger state charm (updated)]
//! ```

use charms_data::{App, Data, Transaction};
use crate::{FeedContext, FeedState, validate};
use fundme_common::{
    events::EventLog,
    types::{Address, FeedAction},
};

// ============ Operation Codes ============

/// Operation codes for feed actions (encoded in witness)
pub mod op {
    /// Initialize feed (first-time creation)
    pub const INITIALIZE: u8 = 0x00;
    /// Publish the next round (operator only)
    pub const UPDATE_ANSWER: u8 = 0x30;
    /// Publish an explicit round (operator only)
    pub const UPDATE_ROUND_DATA: u8 = 0x31;
    /// Set new operator (admin only)
    pub const SET_OPERATOR: u8 = 0x32;
    /// Switch the feed on or off (admin only)
    pub const SET_ACTIVE: u8 = 0x33;
}

// ============ Witness Structures ============

/// Witness data for feed operations
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct FeedWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Admin address (for Initialize)
    pub admin: Option<Address>,
    /// Operator address (for SetOperator or Initialize)
    pub operator: Option<Address>,
    /// Signer of the operation
    pub signer: Option<Address>,
    /// Decimals (for Initialize)
    pub decimals: Option<u8>,
    /// Answer with feed decimals
    pub answer: Option<i128>,
    /// Explicit round id (for UpdateRoundData)
    pub round_id: Option<u64>,
    /// Update timestamp
    pub timestamp: Option<u64>,
    /// Round start timestamp (for UpdateRoundData)
    pub started_at: Option<u64>,
    /// Feed status (for SetActive)
    pub active: Option<bool>,
}

impl FeedWitness {
    /// Create witness for feed initialization
    pub fn initialize(
        admin: Address,
        operator: Address,
        decimals: u8,
        initial_answer: i128,
    ) -> Self {
        Self {
            op: op::INITIALIZE,
            admin: Some(admin),
            operator: Some(operator),
            decimals: Some(decimals),
            answer: Some(initial_answer),
            ..Self::default()
        }
    }

    /// Create witness for publishing the next round
    pub fn update_answer(signer: Address, answer: i128, timestamp: u64) -> Self {
        Self {
            op: op::UPDATE_ANSWER,
            signer: Some(signer),
            answer: Some(answer),
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// Create witness for setting new operator
    pub fn set_operator(signer: Address, operator: Address) -> Self {
        Self {
            op: op::SET_OPERATOR,
            signer: Some(signer),
            operator: Some(operator),
            ..Self::default()
        }
    }
}

// ============ Main Validation Function ============

/// Validates a feed operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The price feed app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (the feed exports data, doesn't read)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_feed_operation(
    app: &App,
    tx: &Transaction,
    _x: &Data,
    w: &Data,
) -> bool {
    // 1. Parse witness to get operation
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    // 2. Convert to internal action type
    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    // 3. Initialize has no input state; check the output against a fresh feed
    if let FeedAction::Initialize { .. } = &action {
        let output_state = match extract_output_state(app, tx) {
            Some(s) => s,
            None => return false,
        };
        let mut ctx = FeedContext {
            state: output_state.clone(),
            new_state: output_state,
            signer: witness.admin.unwrap_or([0u8; 32]),
            events: EventLog::new(),
        };
        return validate(&mut ctx, &action).is_ok();
    }

    // 4. For other operations, extract both input and output states
    let (state, new_state) = match extract_feed_states(app, tx) {
        Some(s) => s,
        None => return false,
    };

    // 5. Signer is declared in the witness; Charms verifies the spend
    let signer = match witness.signer {
        Some(s) => s,
        None => return false,
    };

    let mut ctx = FeedContext {
        state,
        new_state,
        signer,
        events: EventLog::new(),
    };

    validate(&mut ctx, &action).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data into FeedWitness
fn parse_witness(w: &Data) -> Option<FeedWitness> {
    w.value::<FeedWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &FeedWitness) -> Option<FeedAction> {
    match w.op {
        op::INITIALIZE => Some(FeedAction::Initialize {
            admin: w.admin?,
            operator: w.operator?,
            decimals: w.decimals?,
            initial_answer: w.answer?,
        }),
        op::UPDATE_ANSWER => Some(FeedAction::UpdateAnswer {
            answer: w.answer?,
            timestamp: w.timestamp?,
        }),
        op::UPDATE_ROUND_DATA => Some(FeedAction::UpdateRoundData {
            round_id: w.round_id?,
            answer: w.answer?,
            timestamp: w.timestamp?,
            started_at: w.started_at?,
        }),
        op::SET_OPERATOR => Some(FeedAction::SetOperator {
            operator: w.operator?,
        }),
        op::SET_ACTIVE => Some(FeedAction::SetActive {
            active: w.active?,
        }),
        _ => None,
    }
}

// ============ State Extraction ============

/// Extract only the output feed state (for Initialize)
fn extract_output_state(app: &App, tx: &Transaction) -> Option<FeedState> {
    tx.outs.iter()
        .find_map(|charms| {
            charms.get(app).and_then(|data| {
                data.value::<FeedState>().ok()
            })
        })
}

/// Extract feed states from transaction inputs and outputs
fn extract_feed_states(
    app: &App,
    tx: &Transaction,
) -> Option<(FeedState, FeedState)> {
    let input_state = tx.ins.iter()
        .find_map(|(_, charms)| {
            charms.get(app).and_then(|data| {
                data.value::<FeedState>().ok()
            })
        })?;

    let output_state = extract_output_state(app, tx)?;

    Some((input_state, output_state))
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    const ETH_PRICE_2000: i128 = 2_000_00000000;

    #[test]
    fn test_witness_serialization() {
        let witness = FeedWitness::update_answer([1u8; 32], ETH_PRICE_2000, 10);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed.op, op::UPDATE_ANSWER);
        assert_eq!(parsed.answer, Some(ETH_PRICE_2000));
    }

    #[test]
    fn test_witness_to_action() {
        let witness = FeedWitness::update_answer([1u8; 32], ETH_PRICE_2000, 10);
        let action = witness_to_action(&witness).unwrap();

        match action {
            FeedAction::UpdateAnswer { answer, timestamp } => {
                assert_eq!(answer, ETH_PRICE_2000);
                assert_eq!(timestamp, 10);
            }
            _ => panic!("Expected UpdateAnswer action"),
        }
    }

    #[test]
    fn test_initialize_witness() {
        let witness = FeedWitness::initialize([0u8; 32], [1u8; 32], 8, ETH_PRICE_2000);
        let action = witness_to_action(&witness).unwrap();

        assert!(matches!(action, FeedAction::Initialize { decimals: 8, .. }));
    }

    #[test]
    fn test_incomplete_witness_rejected() {
        let mut witness = FeedWitness::set_operator([0u8; 32], [2u8; 32]);
        witness.operator = None;

        assert!(witness_to_action(&witness).is_none());
    }
}
