//! Omnipool Protocol Implementation
//!
//! Every Omnipool asset is paired against the hub asset. A trade sells the
//! input asset for hub reserve and buys the output asset with it, paying the
//! protocol fee on the hub leg and the asset fee on the output leg.

pub mod calculator;
pub mod quote;
pub mod state;

pub use calculator::{calculate_buy, calculate_sell};
pub use quote::OmnipoolQuoteFactory;
pub use state::{OmnipoolAssetState, OmnipoolFees, OmnipoolPairState, OmnipoolStateSource};
