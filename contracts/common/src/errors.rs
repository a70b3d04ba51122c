//! Error Types for the FundMe Ledger
//!
//! Every failure carries a distinguishable reason so callers can branch
//! (top up value, wait for the oracle, give up).

use crate::types::Address;

/// Result type alias for FundMe operations
pub type FundMeResult<T> = Result<T, FundMeError>;

/// Main error enum for all ledger and price feed errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundMeError {
    // ============ Funding Errors ============
    /// Contribution converts to less than the minimum reference value
    InsufficientContribution { reference_value: u128, minimum: u128 },

    // ============ Authorization Errors ============
    /// Caller is not the ledger owner
    NotOwner { owner: Address, caller: Address },

    /// Caller is not authorized for this feed operation
    Unauthorized { expected: Address, actual: Address },

    // ============ Transfer Errors ============
    /// Outbound value transfer was rejected by the recipient
    TransferFailed { to: Address, amount: u128 },

    // ============ Oracle Errors ============
    /// Price oracle could not supply a usable price
    OracleUnavailable { reason: OracleFailureReason },

    /// Requested round has no data
    RoundNotFound { round_id: u64 },

    // ============ Math Errors ============
    /// Arithmetic left the range of the integer width
    ArithmeticOverflow,

    /// Arithmetic underflow occurred
    Underflow,

    // ============ Query Errors ============
    /// Funder sequence has no entry at this position
    IndexOutOfRange { index: usize, len: usize },

    // ============ Input Validation Errors ============
    /// Invalid input parameter
    InvalidInput { param: &'static str, reason: &'static str },

    // ============ State Errors ============
    /// Declared output state does not follow from the input state
    InvalidStateTransition,
}

/// Reasons the price oracle can be unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleFailureReason {
    /// Feed has been switched off
    Inactive,
    /// Feed never published an answer
    NotInitialized,
    /// Latest answer is zero or negative
    NonPositiveAnswer,
    /// Latest round has no completion timestamp
    IncompleteRound,
    /// Latest answer was carried over from an earlier round
    StaleRound,
}

impl FundMeError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientContribution { .. } => "E001_INSUFFICIENT_CONTRIBUTION",
            Self::NotOwner { .. } => "E010_NOT_OWNER",
            Self::Unauthorized { .. } => "E011_UNAUTHORIZED",
            Self::TransferFailed { .. } => "E020_TRANSFER_FAILED",
            Self::OracleUnavailable { .. } => "E030_ORACLE_UNAVAILABLE",
            Self::RoundNotFound { .. } => "E031_ROUND_NOT_FOUND",
            Self::ArithmeticOverflow => "E040_OVERFLOW",
            Self::Underflow => "E041_UNDERFLOW",
            Self::IndexOutOfRange { .. } => "E050_INDEX_OUT_OF_RANGE",
            Self::InvalidInput { .. } => "E060_INVALID_INPUT",
            Self::InvalidStateTransition => "E070_INVALID_STATE",
        }
    }

    /// Returns true if the caller can succeed later without changing identity
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientContribution { .. } => true, // Send more value
            Self::TransferFailed { .. } => true,           // Retry once the recipient accepts
            Self::OracleUnavailable { .. } => true,        // Wait for the feed
            _ => false,
        }
    }
}

impl core::fmt::Display for FundMeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientContribution { reference_value, minimum } => write!(
                f,
                "{}: contribution worth {} is below minimum {}",
                self.code(),
                reference_value,
                minimum
            ),
            Self::TransferFailed { amount, .. } => {
                write!(f, "{}: transfer of {} rejected", self.code(), amount)
            }
            Self::OracleUnavailable { reason } => write!(f, "{}: {:?}", self.code(), reason),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "{}: index {} with length {}", self.code(), index, len)
            }
            _ => f.write_str(self.code()),
        }
    }
}
