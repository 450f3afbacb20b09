//! Stableswap Protocol Implementation
//!
//! Curve-style invariant pools of like-valued assets. Besides swaps between
//! constituents, the pool's share asset can be traded directly: selling a
//! constituent for shares is a single-asset deposit, selling shares for a
//! constituent is a single-asset withdrawal.

pub mod calculator;
pub mod quote;
pub mod state;

pub use quote::StableswapQuoteFactory;
pub use state::{PoolReserve, StableswapPoolState, StableswapStateSource};
