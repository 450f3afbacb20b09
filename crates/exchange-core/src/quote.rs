//! Quote seam shared by every pool family

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::serde_balance;
use crate::{Balance, ChainAssetId, Direction, QuoteError};

/// Arguments for a single-pool quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteArgs {
    pub asset_in: ChainAssetId,
    pub asset_out: ChainAssetId,
    /// Input for a sell, desired output for a buy
    #[serde(with = "serde_balance")]
    pub amount: Balance,
    pub direction: Direction,
}

/// Pool-specific quote factory
///
/// For `Direction::Sell` the result is the output received for `amount` in.
/// For `Direction::Buy` the result is the input required to receive `amount`.
/// Implementations read the pool's current state and apply only the pool's
/// own rounding; slippage is never applied here.
#[async_trait]
pub trait QuoteFactory: Send + Sync {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError>;
}
