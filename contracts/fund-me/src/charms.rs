//! Charms SDK Integration for the FundMe Ledger
//!
//! Bridges Charms transactions to the ledger's state-transition validator.
//!
//! ## UTXO Transformation Model
//!
//! ```text
//! Fund (by anyone):
//!   REFS: [Feed state charm]        <- price for the minimum check
//!   IN:   [Ledger state, coins]
//!   OUT:  [Ledger state (credited)]
//!
//! Withdraw / CheaperWithdraw (by owner):
//!   IN:   [Ledger state]
//!   OUT:  [Ledger state (settled), coins to owner]
//! ```
//!
//! A ledger identity is an x-only key; coins reach it through a P2TR output
//! (`OP_1 <32-byte key>`). Every coin output of a withdrawal must pay the
//! owner, so a forged signer cannot route the balance elsewhere.

use charms_data::{App, Data, Transaction};
use fundme_common::{
    access_control::require_nonzero,
    events::EventLog,
    math::safe_sub,
    oracle::PriceQuote,
    types::{Address, FundMeAction, LedgerState, ZERO_ADDRESS},
};
use fundme_price_feed::FeedState;

use crate::{validate, FundMeContext, Payout};

// ============ Operation Codes ============

/// Operation codes for ledger actions (encoded in witness)
pub mod op {
    /// Deploy the ledger
    pub const INITIALIZE: u8 = 0x00;
    /// Contribute native value
    pub const FUND: u8 = 0x01;
    /// Drain to owner, indexing the funder sequence
    pub const WITHDRAW: u8 = 0x02;
    /// Drain to owner, reading the funder sequence once
    pub const CHEAPER_WITHDRAW: u8 = 0x03;
}

/// `OP_1 OP_PUSHBYTES_32`, the prefix of a P2TR output script
pub const P2TR_PREFIX: [u8; 2] = [0x51, 0x20];

// ============ Witness Structures ============

/// Witness data for ledger operations
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct LedgerWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Signer of the operation (owner for Initialize)
    pub signer: Option<Address>,
    /// Price feed app identity (for Initialize)
    pub price_feed: Option<Address>,
    /// Contribution amount (for Fund)
    pub amount: Option<u128>,
}

impl LedgerWitness {
    /// Create witness for deploying a ledger
    pub fn initialize(owner: Address, price_feed: Address) -> Self {
        Self {
            op: op::INITIALIZE,
            signer: Some(owner),
            price_feed: Some(price_feed),
            ..Self::default()
        }
    }

    /// Create witness for a contribution
    pub fn fund(signer: Address, amount: u128) -> Self {
        Self {
            op: op::FUND,
            signer: Some(signer),
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Create witness for a withdrawal
    pub fn withdraw(signer: Address, cheaper: bool) -> Self {
        Self {
            op: if cheaper { op::CHEAPER_WITHDRAW } else { op::WITHDRAW },
            signer: Some(signer),
            ..Self::default()
        }
    }
}

// ============ Main Validation Function ============

/// Validates a ledger operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The ledger app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused; the price comes from a referenced feed)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_ledger_operation(
    app: &App,
    tx: &Transaction,
    _x: &Data,
    w: &Data,
) -> bool {
    // 1. Parse witness
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    let signer = match witness.signer {
        Some(s) => s,
        None => return false,
    };

    // 2. Initialize has no input state
    if witness.op == op::INITIALIZE {
        return match (extract_output_state(app, tx), witness.price_feed) {
            (Some(output), Some(price_feed)) => {
                validate_initialize(&output, &signer, &price_feed)
            }
            _ => false,
        };
    }

    // 3. Convert to internal action type
    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    // 4. Extract both input and output states
    let (state, new_state) = match extract_ledger_states(app, tx) {
        Some(s) => s,
        None => return false,
    };

    // 5. Value flows and price
    let attached_value = match action {
        FundMeAction::Fund { .. } => {
            let (coins_in, coins_out) = calculate_coin_flows(tx);
            match safe_sub(coins_in, coins_out) {
                Ok(v) => v,
                Err(_) => return false,
            }
        }
        _ => 0,
    };
    let quote = read_quote_from_refs(tx, &state.price_feed);

    let mut ctx = FundMeContext {
        state,
        new_state,
        signer,
        attached_value,
        payouts: extract_payouts(tx),
        quote,
        events: EventLog::new(),
    };

    validate(&mut ctx, &action).is_ok()
}

/// A freshly deployed ledger is empty, owned by the signer, and wired to a
/// real feed
fn validate_initialize(output: &LedgerState, owner: &Address, price_feed: &Address) -> bool {
    if require_nonzero(owner, "owner").is_err() {
        return false;
    }
    if require_nonzero(price_feed, "price_feed").is_err() {
        return false;
    }
    *output == LedgerState::new(*owner, *price_feed)
}

// ============ Parsing Functions ============

/// Parse witness data into LedgerWitness
fn parse_witness(w: &Data) -> Option<LedgerWitness> {
    w.value::<LedgerWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &LedgerWitness) -> Option<FundMeAction> {
    match w.op {
        op::FUND => Some(FundMeAction::Fund { amount: w.amount? }),
        op::WITHDRAW => Some(FundMeAction::Withdraw),
        op::CHEAPER_WITHDRAW => Some(FundMeAction::CheaperWithdraw),
        _ => None,
    }
}

// ============ State Extraction ============

/// Extract only the output ledger state (for Initialize)
fn extract_output_state(app: &App, tx: &Transaction) -> Option<LedgerState> {
    tx.outs.iter()
        .find_map(|charms| {
            charms.get(app).and_then(|data| {
                data.value::<LedgerState>().ok()
            })
        })
}

/// Extract ledger states from transaction inputs and outputs
fn extract_ledger_states(app: &App, tx: &Transaction) -> Option<(LedgerState, LedgerState)> {
    let input_state = tx.ins.iter()
        .find_map(|(_, charms)| {
            charms.get(app).and_then(|data| {
                data.value::<LedgerState>().ok()
            })
        })?;

    let output_state = extract_output_state(app, tx)?;

    Some((input_state, output_state))
}

/// Read a validated quote from the feed whose app identity is `price_feed`
fn read_quote_from_refs(tx: &Transaction, price_feed: &Address) -> Option<PriceQuote> {
    tx.refs.iter().find_map(|(_, charms)| {
        charms.iter().find_map(|(charm_app, data)| {
            if charm_app.identity.0 != *price_feed {
                return None;
            }
            data.value::<FeedState>().ok().and_then(|feed| feed.quote().ok())
        })
    })
}

// ============ Flow Calculations ============

/// Calculate total native coin flowing in and out of the transaction
fn calculate_coin_flows(tx: &Transaction) -> (u128, u128) {
    let inputs = tx.coin_ins
        .as_ref()
        .map(|ins| ins.iter().map(|o| o.amount as u128).sum())
        .unwrap_or(0);

    let outputs = tx.coin_outs
        .as_ref()
        .map(|outs| outs.iter().map(|o| o.amount as u128).sum())
        .unwrap_or(0);

    (inputs, outputs)
}

/// Coin outputs by recipient; scripts other than P2TR pay `ZERO_ADDRESS`
fn extract_payouts(tx: &Transaction) -> Vec<Payout> {
    tx.coin_outs
        .as_ref()
        .map(|outs| {
            outs.iter()
                .map(|o| Payout {
                    to: recipient_of(&o.dest).unwrap_or(ZERO_ADDRESS),
                    amount: o.amount as u128,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Key paid by a P2TR output script
pub fn recipient_of(script: &[u8]) -> Option<Address> {
    if script.len() != P2TR_PREFIX.len() + 32 || script[..2] != P2TR_PREFIX {
        return None;
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&script[2..]);
    Some(key)
}

/// P2TR output script paying `key`
pub fn p2tr_script(key: &Address) -> Vec<u8> {
    let mut script = P2TR_PREFIX.to_vec();
    script.extend_from_slice(key);
    script
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use charms_data::{Charms, NativeOutput, TxId, UtxoId, B32};
    use fundme_common::constants::native::ONE_ETHER;
    use std::collections::BTreeMap;

    const OWNER: Address = [1u8; 32];
    const ALICE: Address = [2u8; 32];
    const MALLORY: Address = [3u8; 32];
    const FEED: Address = [9u8; 32];

    fn create_test_app() -> App {
        App {
            tag: 'n',
            identity: B32([7u8; 32]),
            vk: B32([0u8; 32]),
        }
    }

    fn create_feed_app() -> App {
        App {
            tag: 'n',
            identity: B32(FEED),
            vk: B32([8u8; 32]),
        }
    }

    fn charms_with(app: &App, data: Data) -> Charms {
        let mut charms = Charms::new();
        charms.insert(app.clone(), data);
        charms
    }

    fn coin(to: &Address, amount: u64) -> NativeOutput {
        NativeOutput { amount, dest: p2tr_script(to) }
    }

    fn create_ledger_tx(input: &LedgerState, output: &LedgerState) -> Transaction {
        let app = create_test_app();
        Transaction {
            ins: vec![(UtxoId(TxId([0u8; 32]), 0), charms_with(&app, Data::from(input)))],
            refs: Vec::new(),
            outs: vec![charms_with(&app, Data::from(output))],
            coin_ins: None,
            coin_outs: None,
            prev_txs: BTreeMap::new(),
            app_public_inputs: BTreeMap::new(),
        }
    }

    fn create_funded_state() -> LedgerState {
        let mut state = LedgerState::new(OWNER, FEED);
        state.address_to_amount.insert(ALICE, ONE_ETHER);
        state.funders.push(ALICE);
        state.balance = ONE_ETHER;
        state
    }

    fn run(tx: &Transaction, witness: &LedgerWitness) -> bool {
        validate_ledger_operation(&create_test_app(), tx, &Data::empty(), &Data::from(witness))
    }

    #[test]
    fn test_witness_serialization() {
        let witness = LedgerWitness::fund([2u8; 32], 1_000);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed.op, op::FUND);
        assert_eq!(parsed.amount, Some(1_000));
    }

    #[test]
    fn test_witness_to_action() {
        assert_eq!(
            witness_to_action(&LedgerWitness::fund(OWNER, 7)),
            Some(FundMeAction::Fund { amount: 7 })
        );
        assert_eq!(
            witness_to_action(&LedgerWitness::withdraw(OWNER, false)),
            Some(FundMeAction::Withdraw)
        );
        assert_eq!(
            witness_to_action(&LedgerWitness::withdraw(OWNER, true)),
            Some(FundMeAction::CheaperWithdraw)
        );
    }

    #[test]
    fn test_incomplete_witness_rejected() {
        let mut witness = LedgerWitness::fund(OWNER, 7);
        witness.amount = None;
        assert!(witness_to_action(&witness).is_none());

        // Initialize is handled before action conversion
        assert!(witness_to_action(&LedgerWitness::initialize(OWNER, FEED)).is_none());
    }

    #[test]
    fn test_validate_initialize() {
        let fresh = LedgerState::new(OWNER, FEED);
        assert!(validate_initialize(&fresh, &OWNER, &FEED));
        assert!(!validate_initialize(&fresh, &[2u8; 32], &FEED));

        let mut funded = fresh.clone();
        funded.balance = 1;
        assert!(!validate_initialize(&funded, &OWNER, &FEED));

        let unwired = LedgerState::new(OWNER, [0u8; 32]);
        assert!(!validate_initialize(&unwired, &OWNER, &[0u8; 32]));
    }

    #[test]
    fn test_p2tr_recipient() {
        let script = p2tr_script(&OWNER);
        assert_eq!(script.len(), 34);
        assert_eq!(recipient_of(&script), Some(OWNER));
        assert_eq!(recipient_of(&script[1..]), None);
        assert_eq!(recipient_of(&[0x00, 0x14, 1, 2, 3]), None);
    }

    #[test]
    fn test_withdraw_transaction_pays_owner() {
        let settled = LedgerState::new(OWNER, FEED);
        let mut tx = create_ledger_tx(&create_funded_state(), &settled);
        tx.coin_outs = Some(vec![coin(&OWNER, ONE_ETHER as u64)]);

        assert!(run(&tx, &LedgerWitness::withdraw(OWNER, false)));
        assert!(run(&tx, &LedgerWitness::withdraw(OWNER, true)));
        assert!(!run(&tx, &LedgerWitness::withdraw(ALICE, false)));
    }

    #[test]
    fn test_withdraw_transaction_to_third_party_rejected() {
        let settled = LedgerState::new(OWNER, FEED);
        let mut tx = create_ledger_tx(&create_funded_state(), &settled);

        // Witness claims the owner, coins go elsewhere
        tx.coin_outs = Some(vec![coin(&MALLORY, ONE_ETHER as u64)]);
        assert!(!run(&tx, &LedgerWitness::withdraw(OWNER, false)));

        // Unrecognised output scripts never count as the owner
        tx.coin_outs = Some(vec![NativeOutput { amount: ONE_ETHER as u64, dest: vec![0x6a] }]);
        assert!(!run(&tx, &LedgerWitness::withdraw(OWNER, true)));

        // Nothing paid at all
        tx.coin_outs = None;
        assert!(!run(&tx, &LedgerWitness::withdraw(OWNER, false)));
    }

    #[test]
    fn test_fund_transaction_with_referenced_feed() {
        let amount = ONE_ETHER * 3 / 100;
        let input = LedgerState::new(OWNER, FEED);
        let mut output = input.clone();
        output.address_to_amount.insert(ALICE, amount);
        output.funders.push(ALICE);
        output.balance = amount;

        let feed = FeedState::new(OWNER, OWNER, 8, 2_000_00000000, 1);
        let mut tx = create_ledger_tx(&input, &output);
        tx.coin_ins = Some(vec![coin(&ALICE, amount as u64)]);

        // No feed referenced, no price
        assert!(!run(&tx, &LedgerWitness::fund(ALICE, amount)));

        tx.refs = vec![(
            UtxoId(TxId([1u8; 32]), 0),
            charms_with(&create_feed_app(), Data::from(&feed)),
        )];
        assert!(run(&tx, &LedgerWitness::fund(ALICE, amount)));

        // Declared amount must match the coins attached
        assert!(!run(&tx, &LedgerWitness::fund(ALICE, amount + 1)));

        // Outputs exceeding inputs attach nothing
        tx.coin_outs = Some(vec![coin(&ALICE, amount as u64 + 1)]);
        assert!(!run(&tx, &LedgerWitness::fund(ALICE, amount)));
    }
}
