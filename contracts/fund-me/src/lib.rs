//! FundMe Ledger Contract
//!
//! Custodial funding ledger. Anyone can contribute native value worth at
//! least the USD minimum at the current oracle price; only the deployer can
//! withdraw, and a withdrawal drains everything and resets the books.
//!
//! ## Ordering Guarantee
//!
//! Withdrawals settle the books before value leaves the ledger:
//!
//! ```text
//! require_owner -> zero every funder -> empty funder sequence -> take balance
//!               -> transfer to owner -> (rejected? restore everything)
//! ```
//!
//! The recipient only ever observes settled state. It receives a shared
//! borrow of the ledger, so it cannot re-enter a mutating operation.

pub mod deploy;
pub mod payee;

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;


use fundme_common::{
    access_control::require_owner,
    constants::funding::MINIMUM_USD,
    errors::{FundMeError, FundMeResult, OracleFailureReason},
    events::{EventLog, FundMeEvent},
    math::safe_add,
    oracle::{PriceOracle, PriceQuote},
    types::{Address, FundMeAction, LedgerState, WithdrawStrategy},
};

pub use payee::{AccountBook, Payee};

// ============ Ledger ============

/// A funding ledger bound to one owner and one price oracle
#[derive(Debug)]
pub struct FundMe<O: PriceOracle> {
    state: LedgerState,
    oracle: O,
    events: EventLog,
}

impl<O: PriceOracle> FundMe<O> {
    /// Deploy a ledger; `deployer` becomes the owner for good
    pub fn new(deployer: Address, oracle: O) -> Self {
        Self {
            state: LedgerState::new(deployer, oracle.address()),
            oracle,
            events: EventLog::new(),
        }
    }

    /// Contribute `amount` native units on behalf of `caller`
    ///
    /// # Errors
    /// - `OracleUnavailable` if no usable price can be read
    /// - `InsufficientContribution` if `amount` is worth less than the minimum
    /// - `ArithmeticOverflow` if the conversion or a running total overflows
    pub fn fund(&mut self, caller: Address, amount: u128) -> FundMeResult<()> {
        let quote = self.oracle.get_price()?;
        apply_fund(&mut self.state, &caller, amount, &quote, &mut self.events)
    }

    /// Drain the ledger to the owner, indexing the stored funder sequence
    ///
    /// # Errors
    /// - `NotOwner` if `caller` is not the owner (nothing is read or changed)
    /// - `TransferFailed` if `payee` rejects the value (state is restored)
    pub fn withdraw<P: Payee + ?Sized>(
        &mut self,
        caller: Address,
        payee: &mut P,
    ) -> FundMeResult<u128> {
        self.withdraw_with(caller, payee, WithdrawStrategy::Standard)
    }

    /// Drain the ledger to the owner, reading the funder sequence once
    ///
    /// Same contract and errors as [`FundMe::withdraw`].
    pub fn cheaper_withdraw<P: Payee + ?Sized>(
        &mut self,
        caller: Address,
        payee: &mut P,
    ) -> FundMeResult<u128> {
        self.withdraw_with(caller, payee, WithdrawStrategy::Cheaper)
    }

    fn withdraw_with<P: Payee + ?Sized>(
        &mut self,
        caller: Address,
        payee: &mut P,
        strategy: WithdrawStrategy,
    ) -> FundMeResult<u128> {
        require_owner(&self.state.owner, &caller)?;

        let snapshot = self.state.clone();
        let settlement = settle_withdrawal(&mut self.state, &caller, strategy)?;
        let owner = self.state.owner;

        if !payee.receive(&owner, settlement.amount, &self.state) {
            self.state = snapshot;
            return Err(FundMeError::TransferFailed {
                to: owner,
                amount: settlement.amount,
            });
        }

        self.events.emit(settlement.event(owner, strategy));
        Ok(settlement.amount)
    }

    // ============ Queries ============

    /// Owner identity
    pub fn get_owner(&self) -> Address {
        self.state.owner
    }

    /// Address of the price feed
    pub fn get_price_feed(&self) -> Address {
        self.state.price_feed
    }

    /// Cumulative amount contributed by `funder` since the last withdrawal
    pub fn get_address_to_amount(&self, funder: &Address) -> u128 {
        self.state.amount_of(funder)
    }

    /// Funder at `index` of the funder sequence
    pub fn get_funder(&self, index: usize) -> FundMeResult<Address> {
        self.state.funder_at(index)
    }

    /// Number of contribution events since the last withdrawal
    pub fn funders_len(&self) -> usize {
        self.state.funders.len()
    }

    /// Native value held by the ledger
    pub fn balance(&self) -> u128 {
        self.state.balance
    }

    /// Full ledger state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// The price oracle the ledger reads
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable access to the oracle, for driving a mock feed
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Events emitted by successful operations
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

// ============ State Transitions ============

/// Record a contribution of `amount` priced at `quote`
///
/// Every check runs before the first write.
pub fn apply_fund(
    state: &mut LedgerState,
    funder: &Address,
    amount: u128,
    quote: &PriceQuote,
    events: &mut EventLog,
) -> FundMeResult<()> {
    // 1. Price the contribution
    let reference_value = quote.convert(amount)?;

    // 2. Enforce the minimum
    if reference_value < MINIMUM_USD {
        return Err(FundMeError::InsufficientContribution {
            reference_value,
            minimum: MINIMUM_USD,
        });
    }

    // 3. Compute new totals
    let total_contributed = safe_add(state.amount_of(funder), amount)?;
    let balance = safe_add(state.balance, amount)?;
    let funder_index = state.funders.len() as u64;

    // 4. Commit
    state.address_to_amount.insert(*funder, total_contributed);
    state.funders.push(*funder);
    state.balance = balance;

    // 5. Emit event
    events.emit(FundMeEvent::Funded {
        funder: *funder,
        amount,
        reference_value,
        total_contributed,
        funder_index,
    });

    Ok(())
}

/// Outcome of clearing the books
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Native value to send to the owner
    pub amount: u128,
    /// Entries of the funder sequence that were cleared
    pub funders_cleared: u64,
}

impl Settlement {
    fn event(&self, owner: Address, strategy: WithdrawStrategy) -> FundMeEvent {
        FundMeEvent::Withdrawn {
            owner,
            amount: self.amount,
            funders_cleared: self.funders_cleared,
            strategy,
        }
    }
}

/// Zero every funder, empty the funder sequence and take the balance
///
/// Both strategies leave the same state behind.
pub fn settle_withdrawal(
    state: &mut LedgerState,
    caller: &Address,
    strategy: WithdrawStrategy,
) -> FundMeResult<Settlement> {
    require_owner(&state.owner, caller)?;

    let funders_cleared = state.funders.len() as u64;

    match strategy {
        WithdrawStrategy::Standard => {
            for funder_index in 0..state.funders.len() {
                let funder = state.funders[funder_index];
                state.address_to_amount.remove(&funder);
            }
            state.funders = Vec::new();
        }
        WithdrawStrategy::Cheaper => {
            let funders = std::mem::take(&mut state.funders);
            for funder in &funders {
                state.address_to_amount.remove(funder);
            }
        }
    }

    let amount = std::mem::take(&mut state.balance);

    Ok(Settlement { amount, funders_cleared })
}

// ============ Validation Context ============

/// Native value leaving the ledger towards one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Recipient
    pub to: Address,
    /// Native value paid
    pub amount: u128,
}

/// Context for validating ledger operations as state transitions
pub struct FundMeContext {
    /// Current ledger state
    pub state: LedgerState,
    /// Declared ledger state after the operation
    pub new_state: LedgerState,
    /// Signer address
    pub signer: Address,
    /// Native value attached to the operation
    pub attached_value: u128,
    /// Native value paid out by the operation, per recipient
    pub payouts: Vec<Payout>,
    /// Price read from the feed, if one was referenced
    pub quote: Option<PriceQuote>,
    /// Event log
    pub events: EventLog,
}

/// Main validation entry point
///
/// Replays `action` on a copy of the current state and requires the
/// declared new state and value flows to match.
pub fn validate(ctx: &mut FundMeContext, action: &FundMeAction) -> FundMeResult<()> {
    match action {
        FundMeAction::Fund { amount } => validate_fund(ctx, *amount),
        FundMeAction::Withdraw => validate_withdraw(ctx, WithdrawStrategy::Standard),
        FundMeAction::CheaperWithdraw => validate_withdraw(ctx, WithdrawStrategy::Cheaper),
    }
}

fn validate_fund(ctx: &mut FundMeContext, amount: u128) -> FundMeResult<()> {
    // 1. Declared amount must be the value actually attached
    if ctx.attached_value != amount {
        return Err(FundMeError::InvalidInput {
            param: "amount",
            reason: "does not match attached value",
        });
    }

    // 2. A price must be available
    let quote = ctx.quote.ok_or(FundMeError::OracleUnavailable {
        reason: OracleFailureReason::NotInitialized,
    })?;

    // 3. Replay
    let mut expected = ctx.state.clone();
    let mut events = EventLog::new();
    apply_fund(&mut expected, &ctx.signer, amount, &quote, &mut events)?;

    // 4. Verify new state
    if ctx.new_state != expected {
        return Err(FundMeError::InvalidStateTransition);
    }

    for event in events.into_events() {
        ctx.events.emit(event);
    }
    Ok(())
}

fn validate_withdraw(ctx: &mut FundMeContext, strategy: WithdrawStrategy) -> FundMeResult<()> {
    // 1. Replay (includes the owner check)
    let mut expected = ctx.state.clone();
    let settlement = settle_withdrawal(&mut expected, &ctx.signer, strategy)?;

    // 2. The whole balance must leave, to the owner and nobody else
    let mut paid_to_owner: u128 = 0;
    for payout in &ctx.payouts {
        if payout.to != expected.owner {
            return Err(FundMeError::TransferFailed {
                to: payout.to,
                amount: payout.amount,
            });
        }
        paid_to_owner = safe_add(paid_to_owner, payout.amount)?;
    }
    if paid_to_owner != settlement.amount {
        return Err(FundMeError::TransferFailed {
            to: expected.owner,
            amount: settlement.amount,
        });
    }

    // 3. Verify new state
    if ctx.new_state != expected {
        return Err(FundMeError::InvalidStateTransition);
    }

    ctx.events.emit(settlement.event(expected.owner, strategy));
    Ok(())
}

// ============ Tests ============
