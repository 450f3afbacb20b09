//! XYK Protocol Implementation
//!
//! Isolated constant product pools (x * y = k). The trade fee is taken from
//! the output on a sell and added to the input on a buy.

pub mod calculator;
pub mod quote;
pub mod state;

pub use calculator::{calculate_input, calculate_output, calculate_price_impact};
pub use quote::XykQuoteFactory;
pub use state::{XykFee, XykReserves, XykStateSource};
