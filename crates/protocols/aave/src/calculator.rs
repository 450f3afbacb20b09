//! Money Market Calculator
//!
//! Pure limit checks. Exchange rate is always one to one.

use exchange_core::{Balance, QuoteError};

use crate::state::AaveReserveState;

/// aTokens minted for supplying `amount` of the underlying
pub fn calculate_supply(reserve: &AaveReserveState, amount: Balance) -> Result<Balance, QuoteError> {
    if amount > reserve.supply_headroom() {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(amount)
}

/// Underlying released for burning `amount` of aTokens
pub fn calculate_withdraw(
    reserve: &AaveReserveState,
    amount: Balance,
) -> Result<Balance, QuoteError> {
    if amount > reserve.available_liquidity {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(amount)
}
