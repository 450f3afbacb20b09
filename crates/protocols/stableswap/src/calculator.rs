//! Stableswap Calculator
//!
//! Invariant math over n constituents. Reserves are normalized to 18 decimals
//! before any invariant computation and converted back at the end. The
//! invariant `D` satisfies
//!
//! ```text
//! Ann·S + D = Ann·D + D^(n+1) / (n^n · P)
//! ```
//!
//! where `S` is the sum and `P` the product of the normalized reserves and
//! `Ann = A · n^n`. Both `D` and a single reserve `y` given `D` are found by
//! Newton iteration.

use exchange_core::math::to_balance;
use exchange_core::{Balance, BlockNumber, Permill, QuoteError};
use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};

use crate::state::StableswapPoolState;

const MAX_ITERATIONS: usize = 256;
const TARGET_DECIMALS: u8 = 18;

/// Amplification at `current_block`, ramped linearly between the two points
pub fn calculate_amplification(
    initial: u128,
    final_amp: u128,
    initial_block: BlockNumber,
    final_block: BlockNumber,
    current_block: BlockNumber,
) -> u128 {
    if current_block >= final_block || final_block <= initial_block {
        return final_amp;
    }
    if current_block <= initial_block {
        return initial;
    }

    let elapsed = (current_block - initial_block) as u128;
    let duration = (final_block - initial_block) as u128;

    if final_amp >= initial {
        initial + (final_amp - initial) * elapsed / duration
    } else {
        initial - (initial - final_amp) * elapsed / duration
    }
}

fn ann(amplification: u128, n: usize) -> BigUint {
    BigUint::from(amplification) * BigUint::from(n).pow(n as u32)
}

/// Invariant `D` of normalized reserves
pub fn compute_d(reserves: &[BigUint], amplification: u128) -> Result<BigUint, QuoteError> {
    let n = reserves.len();
    let sum: BigUint = reserves.iter().sum();
    if sum.is_zero() {
        return Ok(BigUint::zero());
    }
    if reserves.iter().any(|r| r.is_zero()) || amplification == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let ann = ann(amplification, n);
    let n_big = BigUint::from(n);
    let mut d = sum.clone();

    for _ in 0..MAX_ITERATIONS {
        let mut d_p = d.clone();
        for reserve in reserves {
            d_p = d_p * &d / (reserve * &n_big);
        }

        let previous = d.clone();
        let numerator = (&ann * &sum + &d_p * &n_big) * &d;
        let denominator = (&ann - 1u32) * &d + (&n_big + 1u32) * &d_p;
        d = numerator / denominator;

        if abs_diff(&d, &previous) <= BigUint::one() {
            return Ok(d);
        }
    }

    Err(QuoteError::CalculationFailed {
        message: "stableswap invariant did not converge".to_string(),
    })
}

/// Reserve of constituent `index` that keeps the invariant at `d`,
/// given the other normalized reserves
pub fn compute_y(
    reserves: &[BigUint],
    index: usize,
    d: &BigUint,
    amplification: u128,
) -> Result<BigUint, QuoteError> {
    let n = reserves.len();
    let ann = ann(amplification, n);
    if ann.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let n_big = BigUint::from(n);
    let mut c = d.clone();
    let mut sum = BigUint::zero();

    for (k, reserve) in reserves.iter().enumerate() {
        if k == index {
            continue;
        }
        if reserve.is_zero() {
            return Err(QuoteError::InsufficientLiquidity);
        }
        sum += reserve;
        c = c * d / (reserve * &n_big);
    }
    c = c * d / (&ann * &n_big);

    let b = sum + d / &ann;
    let mut y = d.clone();

    for _ in 0..MAX_ITERATIONS {
        let previous = y.clone();
        let denominator = &y * 2u32 + &b;
        if &denominator <= d {
            return Err(QuoteError::CalculationFailed {
                message: "stableswap reserve iteration diverged".to_string(),
            });
        }
        y = (&y * &y + &c) / (denominator - d);

        if abs_diff(&y, &previous) <= BigUint::one() {
            return Ok(y);
        }
    }

    Err(QuoteError::CalculationFailed {
        message: "stableswap reserve did not converge".to_string(),
    })
}

fn abs_diff(a: &BigUint, b: &BigUint) -> BigUint {
    if a > b {
        a - b
    } else {
        b - a
    }
}

fn scale(decimals: u8) -> Result<BigUint, QuoteError> {
    if decimals > TARGET_DECIMALS {
        return Err(QuoteError::CalculationFailed {
            message: format!("unsupported asset decimals {}", decimals),
        });
    }
    Ok(BigUint::from(10u32).pow((TARGET_DECIMALS - decimals) as u32))
}

fn normalize(amount: Balance, decimals: u8) -> Result<BigUint, QuoteError> {
    Ok(BigUint::from(amount) * scale(decimals)?)
}

fn denormalize_floor(amount: &BigUint, decimals: u8) -> Result<Balance, QuoteError> {
    to_balance(&(amount / scale(decimals)?)).ok_or(QuoteError::Overflow)
}

fn denormalize_ceil(amount: &BigUint, decimals: u8) -> Result<Balance, QuoteError> {
    let factor = scale(decimals)?;
    to_balance(&div_ceil(amount, &factor)).ok_or(QuoteError::Overflow)
}

fn div_ceil(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + 1u32
    }
}

/// `amount` grossed up so that removing `fee` from it leaves `amount`
fn with_fee_added(amount: Balance, fee: Permill) -> Result<Balance, QuoteError> {
    if fee.is_one() {
        return Err(QuoteError::CalculationFailed {
            message: "pool fee is 100%".to_string(),
        });
    }
    exchange_core::math::mul_div_ceil(
        amount,
        Permill::ACCURACY as u128,
        fee.complement().deconstruct() as u128,
    )
    .ok_or(QuoteError::Overflow)
}

fn without_fee(amount: Balance, fee: Permill) -> Balance {
    amount - fee.mul_floor(amount)
}

struct Normalized {
    reserves: Vec<BigUint>,
    decimals: Vec<u8>,
    amplification: u128,
    d: BigUint,
}

impl Normalized {
    fn from_state(state: &StableswapPoolState) -> Result<Self, QuoteError> {
        let reserves = state
            .reserves
            .iter()
            .map(|r| normalize(r.amount, r.decimals))
            .collect::<Result<Vec<_>, _>>()?;
        let decimals = state.reserves.iter().map(|r| r.decimals).collect();
        let amplification = calculate_amplification(
            state.initial_amplification,
            state.final_amplification,
            state.initial_block,
            state.final_block,
            state.current_block,
        );
        let d = compute_d(&reserves, amplification)?;

        Ok(Self {
            reserves,
            decimals,
            amplification,
            d,
        })
    }

    fn check_index(&self, index: usize) -> Result<(), QuoteError> {
        if index >= self.reserves.len() {
            return Err(QuoteError::CalculationFailed {
                message: format!("asset index {} out of range", index),
            });
        }
        Ok(())
    }
}

/// Output of constituent `j` for selling `amount_in` of constituent `i`
pub fn calculate_out_given_in(
    state: &StableswapPoolState,
    i: usize,
    j: usize,
    amount_in: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(i)?;
    pool.check_index(j)?;

    let mut updated = pool.reserves.clone();
    updated[i] += normalize(amount_in, pool.decimals[i])?;
    let y = compute_y(&updated, j, &pool.d, pool.amplification)?;

    // One unit kept back against iteration error
    let limit = &y + 1u32;
    let out = if pool.reserves[j] > limit {
        &pool.reserves[j] - limit
    } else {
        BigUint::zero()
    };
    let out = denormalize_floor(&out, pool.decimals[j])?;

    Ok(without_fee(out, state.fee))
}

/// Input of constituent `i` required to receive `amount_out` of constituent `j`
pub fn calculate_in_given_out(
    state: &StableswapPoolState,
    i: usize,
    j: usize,
    amount_out: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(i)?;
    pool.check_index(j)?;

    let gross_out = normalize(with_fee_added(amount_out, state.fee)?, pool.decimals[j])?;
    if gross_out >= pool.reserves[j] {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let mut updated = pool.reserves.clone();
    updated[j] -= gross_out;
    let y = compute_y(&updated, i, &pool.d, pool.amplification)?;

    let amount_in = (y + 1u32).checked_sub(&pool.reserves[i]).unwrap_or_default();
    denormalize_ceil(&amount_in, pool.decimals[i])
}

/// Shares minted for depositing `amount_in` of constituent `i`
pub fn calculate_shares(
    state: &StableswapPoolState,
    i: usize,
    amount_in: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(i)?;

    let mut updated = pool.reserves.clone();
    updated[i] += normalize(without_fee(amount_in, state.fee), pool.decimals[i])?;
    let d1 = compute_d(&updated, pool.amplification)?;

    if state.share_issuance == 0 {
        return to_balance(&d1).ok_or(QuoteError::Overflow);
    }

    let minted = BigUint::from(state.share_issuance) * (d1 - &pool.d) / &pool.d;
    to_balance(&minted).ok_or(QuoteError::Overflow)
}

/// Amount of constituent `i` to deposit to mint exactly `shares`
pub fn calculate_add_one_asset(
    state: &StableswapPoolState,
    i: usize,
    shares: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(i)?;
    if state.share_issuance == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let issuance = BigUint::from(state.share_issuance);
    let d1 = div_ceil(&(&pool.d * (&issuance + BigUint::from(shares))), &issuance);
    let y = compute_y(&pool.reserves, i, &d1, pool.amplification)?;

    let net = (y + 1u32).checked_sub(&pool.reserves[i]).unwrap_or_default();
    let net = denormalize_ceil(&net, pool.decimals[i])?;
    with_fee_added(net, state.fee)
}

/// Amount of constituent `j` received for burning `shares`
pub fn calculate_liquidity_out_one_asset(
    state: &StableswapPoolState,
    j: usize,
    shares: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(j)?;
    if shares >= state.share_issuance {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let issuance = BigUint::from(state.share_issuance);
    let d1 = div_ceil(&(&pool.d * (&issuance - BigUint::from(shares))), &issuance);
    let y = compute_y(&pool.reserves, j, &d1, pool.amplification)?;

    let out = pool.reserves[j].checked_sub(&y).unwrap_or_default();
    let out = denormalize_floor(&out, pool.decimals[j])?;
    Ok(without_fee(out, state.fee))
}

/// Shares to burn to withdraw exactly `amount_out` of constituent `j`
pub fn calculate_shares_for_amount(
    state: &StableswapPoolState,
    j: usize,
    amount_out: Balance,
) -> Result<Balance, QuoteError> {
    let pool = Normalized::from_state(state)?;
    pool.check_index(j)?;

    let gross_out = normalize(with_fee_added(amount_out, state.fee)?, pool.decimals[j])?;
    if gross_out >= pool.reserves[j] {
        return Err(QuoteError::InsufficientLiquidity);
    }

    let mut updated = pool.reserves.clone();
    updated[j] -= gross_out;
    let d1 = compute_d(&updated, pool.amplification)?;

    let burned = div_ceil(
        &(BigUint::from(state.share_issuance) * (&pool.d - d1)),
        &pool.d,
    );
    to_balance(&burned).ok_or(QuoteError::Overflow)
}
