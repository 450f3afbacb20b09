//! Money Market (Aave) Protocol Implementation
//!
//! Supplying an underlying asset mints its aToken one to one; withdrawing
//! burns the aToken for the underlying. The router treats both as trades.
//!
//! # Limits
//!
//! - Withdrawals are bounded by the reserve's available liquidity
//! - Supplies are bounded by the reserve's supply cap, when set

pub mod calculator;
pub mod quote;
pub mod state;

pub use calculator::{calculate_supply, calculate_withdraw};
pub use quote::AaveQuoteFactory;
pub use state::{AaveReserveState, AaveStateSource};
