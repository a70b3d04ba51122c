//! Price Oracle Interface
//!
//! The ledger reads one quote per contribution and never caches it.
//! Implementors report failures as `OracleUnavailable` rather than
//! returning a guessed price.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{FundMeError, FundMeResult, OracleFailureReason};
use crate::math::get_conversion_rate;
use crate::types::{Address, RoundData};

/// A validated price: reference units per whole native unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct PriceQuote {
    /// Price with `decimals` fractional digits, always positive
    pub price: u128,
    /// Fractional digits of `price`
    pub decimals: u8,
}

impl PriceQuote {
    /// Value of `native_amount` in the reference currency (18 decimals)
    pub fn convert(&self, native_amount: u128) -> FundMeResult<u128> {
        get_conversion_rate(native_amount, self.price, self.decimals)
    }

    /// Build a quote from an aggregator round
    ///
    /// # Errors
    /// `OracleUnavailable` if the round is incomplete, carried over, or
    /// reports a non-positive answer
    pub fn from_round(round: &RoundData, decimals: u8) -> FundMeResult<Self> {
        if round.updated_at == 0 {
            return Err(FundMeError::OracleUnavailable {
                reason: OracleFailureReason::IncompleteRound,
            });
        }
        if round.answered_in_round < round.round_id {
            return Err(FundMeError::OracleUnavailable {
                reason: OracleFailureReason::StaleRound,
            });
        }
        if round.answer <= 0 {
            return Err(FundMeError::OracleUnavailable {
                reason: OracleFailureReason::NonPositiveAnswer,
            });
        }

        Ok(Self {
            price: round.answer as u128,
            decimals,
        })
    }
}

/// Read-only price source consumed by the ledger
pub trait PriceOracle {
    /// Address the oracle is deployed at
    fn address(&self) -> Address;

    /// Current price of the native asset in the reference currency
    fn get_price(&self) -> FundMeResult<PriceQuote>;
}

impl<T: PriceOracle + ?Sized> PriceOracle for &T {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn get_price(&self) -> FundMeResult<PriceQuote> {
        (**self).get_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_round() -> RoundData {
        RoundData {
            round_id: 3,
            answer: 2_000_00000000,
            started_at: 100,
            updated_at: 100,
            answered_in_round: 3,
        }
    }

    #[test]
    fn test_quote_from_round() {
        let quote = PriceQuote::from_round(&create_test_round(), 8).unwrap();
        assert_eq!(quote, PriceQuote { price: 2_000_00000000, decimals: 8 });
        assert_eq!(
            quote.convert(1_000_000_000_000_000_000).unwrap(),
            2_000_000_000_000_000_000_000
        );
    }

    #[test]
    fn test_quote_rejects_bad_rounds() {
        let mut round = create_test_round();
        round.answer = 0;
        assert_eq!(
            PriceQuote::from_round(&round, 8),
            Err(FundMeError::OracleUnavailable { reason: OracleFailureReason::NonPositiveAnswer })
        );

        let mut round = create_test_round();
        round.answer = -5;
        assert!(PriceQuote::from_round(&round, 8).is_err());

        let mut round = create_test_round();
        round.updated_at = 0;
        assert_eq!(
            PriceQuote::from_round(&round, 8),
            Err(FundMeError::OracleUnavailable { reason: OracleFailureReason::IncompleteRound })
        );

        let mut round = create_test_round();
        round.answered_in_round = 2;
        assert_eq!(
            PriceQuote::from_round(&round, 8),
            Err(FundMeError::OracleUnavailable { reason: OracleFailureReason::StaleRound })
        );
    }

    struct FixedOracle(PriceQuote);

    impl PriceOracle for FixedOracle {
        fn address(&self) -> Address {
            [9u8; 32]
        }

        fn get_price(&self) -> FundMeResult<PriceQuote> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_oracle_through_reference() {
        let oracle = FixedOracle(PriceQuote { price: 1, decimals: 0 });
        let by_ref: &FixedOracle = &oracle;

        assert_eq!(PriceOracle::address(&by_ref), [9u8; 32]);
        assert_eq!(by_ref.get_price().unwrap().price, 1);
    }
}
