//! XYK State Types

use async_trait::async_trait;
use exchange_core::types::serde_balance;
use exchange_core::{Balance, ChainAssetId, QuoteError};
use serde::{Deserialize, Serialize};

/// Trade fee as a fraction, e.g. 3/1000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XykFee {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for XykFee {
    fn default() -> Self {
        Self {
            numerator: 3,
            denominator: 1000,
        }
    }
}

/// Pool balances oriented along the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XykReserves {
    #[serde(with = "serde_balance")]
    pub reserve_in: Balance,
    #[serde(with = "serde_balance")]
    pub reserve_out: Balance,
}

#[async_trait]
pub trait XykStateSource: Send + Sync {
    /// Reserves of the pool holding both assets, `None` if no such pool exists
    async fn fetch_reserves(
        &self,
        asset_in: &ChainAssetId,
        asset_out: &ChainAssetId,
    ) -> Result<Option<XykReserves>, QuoteError>;

    /// `GetExchangeFee` runtime constant
    async fn trade_fee(&self) -> Result<XykFee, QuoteError>;
}
