//! Access Control
//!
//! Single-owner guard for withdrawal-class operations. Contribution-class
//! operations are open to any caller and never consult this module.

use crate::errors::{FundMeError, FundMeResult};
use crate::types::{Address, ZERO_ADDRESS};

/// Returns true if `caller` is `owner`
pub fn is_owner(owner: &Address, caller: &Address) -> bool {
    owner == caller
}

/// Fail with `NotOwner` unless `caller` is `owner`
pub fn require_owner(owner: &Address, caller: &Address) -> FundMeResult<()> {
    if !is_owner(owner, caller) {
        return Err(FundMeError::NotOwner {
            owner: *owner,
            caller: *caller,
        });
    }
    Ok(())
}

/// Fail with `Unauthorized` unless `actual` is `expected`
pub fn require_signer(expected: &Address, actual: &Address) -> FundMeResult<()> {
    if expected != actual {
        return Err(FundMeError::Unauthorized {
            expected: *expected,
            actual: *actual,
        });
    }
    Ok(())
}

/// Reject the zero address where a real identity is required
pub fn require_nonzero(address: &Address, param: &'static str) -> FundMeResult<()> {
    if *address == ZERO_ADDRESS {
        return Err(FundMeError::InvalidInput {
            param,
            reason: "zero address",
        });
    }
    Ok(())
}
