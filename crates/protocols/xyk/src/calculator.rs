//! XYK Calculator
//!
//! Swap math using constant product formula (x * y = k).

use exchange_core::{Balance, QuoteError};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::state::XykFee;

fn fee_amount(amount: &BigUint, fee: XykFee) -> Result<BigUint, QuoteError> {
    if fee.denominator == 0 {
        return Err(QuoteError::CalculationFailed {
            message: "trade fee denominator is zero".to_string(),
        });
    }
    if fee.numerator > fee.denominator {
        return Err(QuoteError::CalculationFailed {
            message: format!("trade fee {}/{} exceeds 100%", fee.numerator, fee.denominator),
        });
    }
    Ok(amount * BigUint::from(fee.numerator) / BigUint::from(fee.denominator))
}

/// Calculate swap output using constant product formula
///
/// Formula: output = reserves_out * input / (reserves_in + input), less the trade fee
pub fn calculate_output(
    reserves_in: Balance,
    reserves_out: Balance,
    input_amount: Balance,
    fee: XykFee,
) -> Result<Balance, QuoteError> {
    if reserves_in == 0 || reserves_out == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }
    if input_amount == 0 {
        return Ok(0);
    }

    let numerator = BigUint::from(reserves_out) * BigUint::from(input_amount);
    let denominator = BigUint::from(reserves_in) + BigUint::from(input_amount);
    let output = numerator / denominator;
    let output = &output - fee_amount(&output, fee)?;

    output.to_u128().ok_or(QuoteError::Overflow)
}

/// Calculate required input for desired output (reverse calculation)
///
/// Formula: input = reserves_in * output / (reserves_out - output) + 1, plus the trade fee
pub fn calculate_input(
    reserves_in: Balance,
    reserves_out: Balance,
    output_amount: Balance,
    fee: XykFee,
) -> Result<Balance, QuoteError> {
    if reserves_in == 0 || reserves_out == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }
    if output_amount >= reserves_out {
        return Err(QuoteError::InsufficientLiquidity); // Can't take more than reserves
    }
    if output_amount == 0 {
        return Ok(0);
    }

    let numerator = BigUint::from(reserves_in) * BigUint::from(output_amount);
    let denominator = BigUint::from(reserves_out - output_amount);
    if denominator.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let input = numerator / denominator + 1u32; // Round up
    let input = &input + fee_amount(&input, fee)?;

    input.to_u128().ok_or(QuoteError::Overflow)
}

/// Calculate price impact as percentage
pub fn calculate_price_impact(
    reserves_in: Balance,
    reserves_out: Balance,
    input_amount: Balance,
    output_amount: Balance,
) -> f64 {
    if input_amount == 0 || output_amount == 0 || reserves_in == 0 {
        return 0.0;
    }

    let spot_price = reserves_out as f64 / reserves_in as f64;
    let execution_price = output_amount as f64 / input_amount as f64;

    if spot_price == 0.0 {
        return 0.0;
    }

    ((spot_price - execution_price) / spot_price).abs() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_output_basic() {
        // 1M in, 1M out reserves, swap 1000 with 0.3% fee
        let output = calculate_output(1_000_000, 1_000_000, 1_000, XykFee::default()).unwrap();
        // 1000 * 1_000_000 / 1_001_000 = 999, fee 2
        assert_eq!(output, 997);
    }

    #[test]
    fn test_calculate_output_zero_input() {
        assert_eq!(calculate_output(1_000_000, 1_000_000, 0, XykFee::default()).unwrap(), 0);
    }

    #[test]
    fn test_calculate_output_empty_pool() {
        let err = calculate_output(0, 1_000_000, 1_000, XykFee::default()).unwrap_err();
        assert_eq!(err, QuoteError::InsufficientLiquidity);
    }

    #[test]
    fn test_calculate_output_wide_reserves() {
        let reserves = u128::MAX / 4;
        let output = calculate_output(reserves, reserves, 1_000_000, XykFee::default()).unwrap();
        assert_eq!(output, 997_000);
    }

    #[test]
    fn test_calculate_input_basic() {
        // 1_000_000 * 1000 / 999_000 + 1 = 1002, fee 3
        let input = calculate_input(1_000_000, 1_000_000, 1_000, XykFee::default()).unwrap();
        assert_eq!(input, 1_005);
    }

    #[test]
    fn test_calculate_input_exceeds_reserves() {
        let err = calculate_input(1_000_000, 1_000_000, 1_000_000, XykFee::default()).unwrap_err();
        assert_eq!(err, QuoteError::InsufficientLiquidity);
    }

    #[test]
    fn test_fee_above_one_is_rejected() {
        let fee = XykFee {
            numerator: 1001,
            denominator: 1000,
        };
        let err = calculate_output(1_000_000_000_000, 1_000_000_000_000, 1_000_000_000, fee)
            .unwrap_err();
        assert!(matches!(err, QuoteError::CalculationFailed { .. }));

        let err = calculate_input(1_000_000, 1_000_000, 1_000, fee).unwrap_err();
        assert!(matches!(err, QuoteError::CalculationFailed { .. }));
    }

    #[test]
    fn test_full_fee_leaves_nothing() {
        let fee = XykFee {
            numerator: 1,
            denominator: 1,
        };
        assert_eq!(calculate_output(1_000_000, 1_000_000, 1_000, fee).unwrap(), 0);
    }

    #[test]
    fn test_price_impact_grows_with_size() {
        let small_out = calculate_output(1_000_000, 1_000_000, 1_000, XykFee::default()).unwrap();
        let large_out = calculate_output(1_000_000, 1_000_000, 100_000, XykFee::default()).unwrap();
        let small = calculate_price_impact(1_000_000, 1_000_000, 1_000, small_out);
        let large = calculate_price_impact(1_000_000, 1_000_000, 100_000, large_out);
        assert!(large > small);
    }
}
