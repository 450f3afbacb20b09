//! exchange-core: Shared types, errors, and configuration
//!
//! This crate provides the foundational types used across the swap engine
//! workspace: asset identifiers, balances, swap limits, the quote seam that
//! every pool family implements, and the error taxonomy.

pub mod config;
pub mod errors;
pub mod math;
pub mod quote;
pub mod types;

pub use config::*;
pub use errors::*;
pub use quote::*;
pub use types::*;
