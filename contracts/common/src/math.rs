//! Mathematical Utilities for the FundMe Ledger
//!
//! Checked fixed-point conversions between native value and the
//! reference currency.

use crate::errors::{FundMeError, FundMeResult};

/// `10^exp` as `u128`, or `ArithmeticOverflow` past 10^38
pub fn pow10(exp: u8) -> FundMeResult<u128> {
    10u128.checked_pow(exp as u32).ok_or(FundMeError::ArithmeticOverflow)
}

/// Convert a native amount into its reference-currency value
///
/// reference_value = native_amount * price / 10^price_decimals
///
/// The native amount carries 18 decimals, so the result is the reference
/// value with 18 decimals. Rounds toward zero, which keeps the result within
/// one unit in the last place of the exact quotient.
///
/// # Arguments
/// * `native_amount` - Amount in native base units (18 decimals)
/// * `price` - Reference units per whole native unit, `price_decimals` decimals
/// * `price_decimals` - Decimals of `price` as declared by the oracle
///
/// # Errors
/// `ArithmeticOverflow` if the product or the scale leaves `u128`
pub fn get_conversion_rate(
    native_amount: u128,
    price: u128,
    price_decimals: u8,
) -> FundMeResult<u128> {
    let scale = pow10(price_decimals)?;

    native_amount
        .checked_mul(price)
        .ok_or(FundMeError::ArithmeticOverflow)?
        .checked_div(scale)
        .ok_or(FundMeError::ArithmeticOverflow)
}

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> FundMeResult<u128> {
    a.checked_add(b).ok_or(FundMeError::ArithmeticOverflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> FundMeResult<u128> {
    a.checked_sub(b).ok_or(FundMeError::Underflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{funding::MINIMUM_USD, native::ONE_ETHER};

    const ETH_PRICE_2000: u128 = 2_000_00000000; // $2,000 with 8 decimals
    const ONE_USD: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_conversion_one_ether() {
        let value = get_conversion_rate(ONE_ETHER, ETH_PRICE_2000, 8).unwrap();
        assert_eq!(value, 2_000 * ONE_USD);
    }

    #[test]
    fn test_conversion_threshold_scenario() {
        // 0.03 ETH at $2,000 = $60, above the $50 minimum
        let accepted = get_conversion_rate(30_000_000_000_000_000, ETH_PRICE_2000, 8).unwrap();
        assert_eq!(accepted, 60 * ONE_USD);
        assert!(accepted >= MINIMUM_USD);

        // 0.01 ETH at $2,000 = $20, below the minimum
        let rejected = get_conversion_rate(10_000_000_000_000_000, ETH_PRICE_2000, 8).unwrap();
        assert_eq!(rejected, 20 * ONE_USD);
        assert!(rejected < MINIMUM_USD);
    }

    #[test]
    fn test_conversion_rounds_down() {
        // 1 wei at $2,000 is 2000e8 / 1e8 = 2000 reference units exactly;
        // 1 wei at $0.00000001 (price 1) is 1 / 1e8 = 0
        assert_eq!(get_conversion_rate(1, ETH_PRICE_2000, 8).unwrap(), 2_000);
        assert_eq!(get_conversion_rate(1, 1, 8).unwrap(), 0);
        assert_eq!(get_conversion_rate(199_999_999, 1, 8).unwrap(), 1);
    }

    #[test]
    fn test_conversion_zero_amount() {
        assert_eq!(get_conversion_rate(0, ETH_PRICE_2000, 8).unwrap(), 0);
    }

    #[test]
    fn test_conversion_overflow() {
        assert_eq!(
            get_conversion_rate(u128::MAX, ETH_PRICE_2000, 8),
            Err(FundMeError::ArithmeticOverflow)
        );
        // 10^39 does not fit in u128
        assert_eq!(
            get_conversion_rate(ONE_ETHER, ETH_PRICE_2000, 39),
            Err(FundMeError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_conversion_realistic_range_fits() {
        // A million ETH at a million dollars each still fits
        let amount = 1_000_000 * ONE_ETHER;
        let price = 1_000_000_00000000u128;
        assert!(get_conversion_rate(amount, price, 8).is_ok());
    }

    #[test]
    fn test_safe_math() {
        assert_eq!(safe_add(1, 2), Ok(3));
        assert_eq!(safe_add(u128::MAX, 1), Err(FundMeError::ArithmeticOverflow));
        assert_eq!(safe_sub(3, 2), Ok(1));
        assert_eq!(safe_sub(2, 3), Err(FundMeError::Underflow));
    }
}
