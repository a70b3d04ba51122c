//! Price Feed Contract
//!
//! ETH/USD price feed for the FundMe ledger on development networks.
//! Behaves like a V3 aggregator: every published answer opens a new round,
//! rounds are kept for historical lookups, and consumers read the latest
//! round through the `PriceOracle` trait.
//!
//! ## Reference Input Pattern (UTXO Model)
//!
//! The feed charm is used as a **reference input** by the ledger:
//! - Not consumed when read
//! - Only the operator can publish answers
//! - Only the admin can change the operator or switch the feed off

use borsh::{BorshDeserialize, BorshSerialize};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use fundme_common::{
    access_control::{require_nonzero, require_signer},
    constants::price_feed::{DECIMALS, DESCRIPTION, INITIAL_ANSWER, VERSION},
    errors::{FundMeError, FundMeResult, OracleFailureReason},
    events::{EventLog, FundMeEvent},
    oracle::{PriceOracle, PriceQuote},
    types::{Address, FeedAction, RoundData},
};

// ============ Feed State ============

/// Price feed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeedState {
    /// Decimals of every answer
    pub decimals: u8,
    /// Most recent round
    pub latest: RoundData,
    /// Every published round by id
    pub rounds: BTreeMap<u64, RoundData>,
    /// Admin (can change operator, switch the feed on and off)
    pub admin: Address,
    /// Authorized operator (can publish answers)
    pub operator: Address,
    /// Whether the feed is serving prices
    pub is_active: bool,
}

impl FeedState {
    /// Create a feed whose first round carries `initial_answer`
    pub fn new(
        admin: Address,
        operator: Address,
        decimals: u8,
        initial_answer: i128,
        timestamp: u64,
    ) -> Self {
        let mut state = Self {
            decimals,
            latest: RoundData::default(),
            rounds: BTreeMap::new(),
            admin,
            operator,
            is_active: true,
        };
        state.record_round(1, initial_answer, timestamp, timestamp);
        state
    }

    /// Round id the next `UpdateAnswer` will open
    pub fn next_round_id(&self) -> u64 {
        self.latest.round_id.saturating_add(1)
    }

    /// Current validated quote
    ///
    /// # Errors
    /// `OracleUnavailable` if the feed is off, empty, or its latest round is unusable
    pub fn quote(&self) -> FundMeResult<PriceQuote> {
        if !self.is_active {
            return Err(FundMeError::OracleUnavailable {
                reason: OracleFailureReason::Inactive,
            });
        }
        if self.latest.round_id == 0 {
            return Err(FundMeError::OracleUnavailable {
                reason: OracleFailureReason::NotInitialized,
            });
        }
        PriceQuote::from_round(&self.latest, self.decimals)
    }

    fn record_round(&mut self, round_id: u64, answer: i128, updated_at: u64, started_at: u64) {
        let round = RoundData {
            round_id,
            answer,
            started_at,
            updated_at,
            answered_in_round: round_id,
        };
        self.latest = round;
        self.rounds.insert(round_id, round);
    }
}

// ============ Validation Context ============

/// Context for validating feed operations
pub struct FeedContext {
    /// Current feed state
    pub state: FeedState,
    /// Updated feed state
    pub new_state: FeedState,
    /// Signer address
    pub signer: Address,
    /// Event log
    pub events: EventLog,
}

// ============ Validation Functions ============

/// Main validation entry point
///
/// Replays `action` against the current state and requires the declared
/// new state to match the result exactly.
pub fn validate(ctx: &mut FeedContext, action: &FeedAction) -> FundMeResult<()> {
    if let FeedAction::Initialize { admin, operator, decimals, initial_answer } = action {
        let expected = FeedState::new(
            *admin,
            *operator,
            *decimals,
            *initial_answer,
            ctx.new_state.latest.updated_at,
        );
        if ctx.new_state != expected {
            return Err(FundMeError::InvalidStateTransition);
        }
        return Ok(());
    }

    let mut expected = ctx.state.clone();
    let mut events = EventLog::new();
    execute(&mut expected, &ctx.signer, action, &mut events)?;

    if ctx.new_state != expected {
        return Err(FundMeError::InvalidStateTransition);
    }

    for event in events.into_events() {
        ctx.events.emit(event);
    }
    Ok(())
}

/// Apply a feed action to `state`
///
/// All checks run before the first write, so `state` is untouched on error.
pub fn execute(
    state: &mut FeedState,
    signer: &Address,
    action: &FeedAction,
    events: &mut EventLog,
) -> FundMeResult<()> {
    match action {
        FeedAction::Initialize { .. } => Err(FundMeError::InvalidStateTransition),
        FeedAction::UpdateAnswer { answer, timestamp } => {
            execute_update_answer(state, signer, *answer, *timestamp, events)
        }
        FeedAction::UpdateRoundData { round_id, answer, timestamp, started_at } => {
            execute_update_round_data(
                state, signer, *round_id, *answer, *timestamp, *started_at, events,
            )
        }
        FeedAction::SetOperator { operator } => {
            execute_set_operator(state, signer, operator, events)
        }
        FeedAction::SetActive { active } => execute_set_active(state, signer, *active, events),
    }
}

/// Publish `answer` as the next round
fn execute_update_answer(
    state: &mut FeedState,
    signer: &Address,
    answer: i128,
    timestamp: u64,
    events: &mut EventLog,
) -> FundMeResult<()> {
    // 1. Only operator can publish
    require_signer(&state.operator, signer)?;

    // 2. Round counter must not wrap
    let round_id = state
        .latest
        .round_id
        .checked_add(1)
        .ok_or(FundMeError::ArithmeticOverflow)?;

    // 3. Record
    state.record_round(round_id, answer, timestamp, timestamp);

    // 4. Emit event
    events.emit(FundMeEvent::AnswerUpdated {
        round_id,
        answer,
        updated_at: timestamp,
    });

    Ok(())
}

/// Publish `answer` for an explicit round
fn execute_update_round_data(
    state: &mut FeedState,
    signer: &Address,
    round_id: u64,
    answer: i128,
    timestamp: u64,
    started_at: u64,
    events: &mut EventLog,
) -> FundMeResult<()> {
    require_signer(&state.operator, signer)?;

    if round_id == 0 {
        return Err(FundMeError::InvalidInput {
            param: "round_id",
            reason: "rounds start at 1",
        });
    }

    state.record_round(round_id, answer, timestamp, started_at);

    events.emit(FundMeEvent::AnswerUpdated {
        round_id,
        answer,
        updated_at: timestamp,
    });

    Ok(())
}

/// Validate operator change
fn execute_set_operator(
    state: &mut FeedState,
    signer: &Address,
    new_operator: &Address,
    events: &mut EventLog,
) -> FundMeResult<()> {
    // 1. Only admin can change operator
    require_signer(&state.admin, signer)?;

    // 2. New operator must be a real, different identity
    require_nonzero(new_operator, "operator")?;
    if *new_operator == state.operator {
        return Err(FundMeError::InvalidInput {
            param: "operator",
            reason: "same as current",
        });
    }

    let old_operator = state.operator;
    state.operator = *new_operator;

    events.emit(FundMeEvent::FeedOperatorChanged {
        old_operator,
        new_operator: *new_operator,
    });

    Ok(())
}

fn execute_set_active(
    state: &mut FeedState,
    signer: &Address,
    active: bool,
    events: &mut EventLog,
) -> FundMeResult<()> {
    require_signer(&state.admin, signer)?;

    if state.is_active == active {
        return Err(FundMeError::InvalidInput {
            param: "active",
            reason: "same as current",
        });
    }

    state.is_active = active;
    events.emit(FundMeEvent::FeedStatusChanged { active });

    Ok(())
}

// ============ Mock Aggregator ============

/// In-process V3 aggregator for development networks and tests
///
/// Keeps its own logical clock: every published answer is stamped with the
/// current time, which then advances by one.
#[derive(Debug, Clone)]
pub struct MockV3Aggregator {
    address: Address,
    state: FeedState,
    now: u64,
    events: EventLog,
}

impl MockV3Aggregator {
    /// Deploy a feed at `address`, administered and operated by `deployer`
    pub fn new(address: Address, deployer: Address, decimals: u8, initial_answer: i128) -> Self {
        Self {
            address,
            state: FeedState::new(deployer, deployer, decimals, initial_answer, 1),
            now: 2,
            events: EventLog::new(),
        }
    }

    /// Deploy with the development defaults (8 decimals, 200 USD)
    pub fn with_defaults(address: Address, deployer: Address) -> Self {
        Self::new(address, deployer, DECIMALS, INITIAL_ANSWER)
    }

    /// Publish a new answer as the next round
    pub fn update_answer(&mut self, signer: &Address, answer: i128) -> FundMeResult<()> {
        let action = FeedAction::UpdateAnswer { answer, timestamp: self.now };
        self.apply(signer, &action)?;
        self.now = self.now.saturating_add(1);
        Ok(())
    }

    /// Publish an answer for an explicit round with explicit timestamps
    pub fn update_round_data(
        &mut self,
        signer: &Address,
        round_id: u64,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    ) -> FundMeResult<()> {
        let action = FeedAction::UpdateRoundData { round_id, answer, timestamp, started_at };
        self.apply(signer, &action)
    }

    /// Hand publishing rights to another operator (admin only)
    pub fn set_operator(&mut self, signer: &Address, operator: Address) -> FundMeResult<()> {
        self.apply(signer, &FeedAction::SetOperator { operator })
    }

    /// Switch the feed on or off (admin only)
    pub fn set_active(&mut self, signer: &Address, active: bool) -> FundMeResult<()> {
        self.apply(signer, &FeedAction::SetActive { active })
    }

    /// Advance the logical clock
    pub fn set_time(&mut self, now: u64) {
        self.now = now;
    }

    fn apply(&mut self, signer: &Address, action: &FeedAction) -> FundMeResult<()> {
        execute(&mut self.state, signer, action, &mut self.events)
    }

    /// Latest round as published
    pub fn latest_round_data(&self) -> RoundData {
        self.state.latest
    }

    /// A historical round
    pub fn get_round_data(&self, round_id: u64) -> FundMeResult<RoundData> {
        self.state
            .rounds
            .get(&round_id)
            .copied()
            .ok_or(FundMeError::RoundNotFound { round_id })
    }

    /// Latest raw answer
    pub fn latest_answer(&self) -> i128 {
        self.state.latest.answer
    }

    /// Latest round id
    pub fn latest_round(&self) -> u64 {
        self.state.latest.round_id
    }

    /// Decimals of every answer
    pub fn decimals(&self) -> u8 {
        self.state.decimals
    }

    /// Feed description
    pub fn description(&self) -> &'static str {
        DESCRIPTION
    }

    /// Aggregator interface version
    pub fn version(&self) -> u64 {
        VERSION
    }

    /// Full feed state
    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// Events emitted by this feed
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

impl PriceOracle for MockV3Aggregator {
    fn address(&self) -> Address {
        self.address
    }

    fn get_price(&self) -> FundMeResult<PriceQuote> {
        self.state.quote()
    }
}

// ============ Tests ============
