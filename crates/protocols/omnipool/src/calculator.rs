//! Omnipool Calculator
//!
//! Trade math through the hub asset. All intermediate products go through
//! `BigUint` so reserves up to `u128::MAX` are safe.

use exchange_core::math::{mul_div_floor, to_balance};
use exchange_core::{Balance, Permill, QuoteError};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::state::OmnipoolAssetState;

/// Output received for selling `amount_in`
///
/// ```text
/// Δhub_in  = amount_in · hub_in / (reserve_in + amount_in)
/// Δhub_out = Δhub_in − protocol_fee · Δhub_in
/// Δout     = Δhub_out · reserve_out / (hub_out + Δhub_out)
/// out      = (1 − asset_fee) · Δout
/// ```
pub fn calculate_sell(
    amount_in: Balance,
    asset_in: &OmnipoolAssetState,
    asset_out: &OmnipoolAssetState,
    asset_fee: Permill,
    protocol_fee: Permill,
) -> Result<Balance, QuoteError> {
    let reserve_in = BigUint::from(asset_in.reserve) + BigUint::from(amount_in);
    if reserve_in.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let delta_hub_in = BigUint::from(amount_in) * BigUint::from(asset_in.hub_reserve) / reserve_in;
    let delta_hub_in = to_balance(&delta_hub_in).ok_or(QuoteError::Overflow)?;

    let delta_hub_out = delta_hub_in - protocol_fee.mul_floor(delta_hub_in);

    let hub_out = BigUint::from(asset_out.hub_reserve) + BigUint::from(delta_hub_out);
    if hub_out.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let delta_out = BigUint::from(delta_hub_out) * BigUint::from(asset_out.reserve) / hub_out;
    let delta_out = to_balance(&delta_out).ok_or(QuoteError::Overflow)?;

    Ok(asset_fee.complement().mul_floor(delta_out))
}

/// Input required to receive `amount_out`
///
/// Inverse of [`calculate_sell`]; each division rounds up by one so the
/// quoted input never undershoots what the pool will charge.
pub fn calculate_buy(
    amount_out: Balance,
    asset_in: &OmnipoolAssetState,
    asset_out: &OmnipoolAssetState,
    asset_fee: Permill,
    protocol_fee: Permill,
) -> Result<Balance, QuoteError> {
    if asset_fee.is_one() {
        return Err(QuoteError::CalculationFailed {
            message: "asset fee consumes the whole output reserve".to_string(),
        });
    }
    if protocol_fee.is_one() {
        return Err(QuoteError::CalculationFailed {
            message: "protocol fee consumes the whole hub leg".to_string(),
        });
    }

    let reserve_out_no_fee = asset_fee.complement().mul_floor(asset_out.reserve);
    if reserve_out_no_fee <= amount_out {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let delta_hub_out = BigUint::from(asset_out.hub_reserve) * BigUint::from(amount_out)
        / BigUint::from(reserve_out_no_fee - amount_out)
        + 1u32;
    let delta_hub_out = to_balance(&delta_hub_out).ok_or(QuoteError::Overflow)?;

    // Δhub_out = (1 − protocol_fee) · Δhub_in
    let accuracy = Permill::ACCURACY as u128;
    let delta_hub_in = mul_div_floor(
        delta_hub_out,
        accuracy,
        protocol_fee.complement().deconstruct() as u128,
    )
    .ok_or(QuoteError::Overflow)?;

    if asset_in.hub_reserve <= delta_hub_in {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let amount_in = BigUint::from(asset_in.reserve) * BigUint::from(delta_hub_in)
        / BigUint::from(asset_in.hub_reserve - delta_hub_in)
        + 1u32;

    to_balance(&amount_in).ok_or(QuoteError::Overflow)
}
