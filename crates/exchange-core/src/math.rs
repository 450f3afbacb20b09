//! Big-integer helpers for balance arithmetic
//!
//! Balances are `u128`; intermediate products of two balances do not fit, so
//! every ratio is computed in `BigUint` and narrowed back at the end.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::Balance;

/// `value * numerator / denominator`, rounded down.
///
/// Returns `None` on a zero denominator or when the result exceeds `u128`.
pub fn mul_div_floor(value: Balance, numerator: u128, denominator: u128) -> Option<Balance> {
    if denominator == 0 {
        return None;
    }

    let result = BigUint::from(value) * BigUint::from(numerator) / BigUint::from(denominator);
    result.to_u128()
}

/// `value * numerator / denominator`, rounded up.
pub fn mul_div_ceil(value: Balance, numerator: u128, denominator: u128) -> Option<Balance> {
    if denominator == 0 {
        return None;
    }

    let product = BigUint::from(value) * BigUint::from(numerator);
    let denominator = BigUint::from(denominator);
    let quotient = &product / &denominator;
    let rounded = if (&product % &denominator).is_zero() {
        quotient
    } else {
        quotient + 1u32
    };
    rounded.to_u128()
}

/// Narrow a big integer to a balance.
pub fn to_balance(value: &BigUint) -> Option<Balance> {
    value.to_u128()
}
