//! Money Market State Types

use async_trait::async_trait;
use exchange_core::types::serde_balance;
use exchange_core::{Balance, ChainAssetId, QuoteError};
use serde::{Deserialize, Serialize};

/// One money-market reserve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaveReserveState {
    pub underlying: ChainAssetId,
    pub atoken: ChainAssetId,

    /// Underlying held by the reserve and not lent out
    #[serde(with = "serde_balance")]
    pub available_liquidity: Balance,
    #[serde(with = "serde_balance")]
    pub total_supplied: Balance,
    /// `None` means uncapped
    #[serde(default)]
    pub supply_cap: Option<Balance>,
}

impl AaveReserveState {
    /// Room left under the supply cap
    pub fn supply_headroom(&self) -> Balance {
        match self.supply_cap {
            Some(cap) => cap.saturating_sub(self.total_supplied),
            None => Balance::MAX,
        }
    }
}

#[async_trait]
pub trait AaveStateSource: Send + Sync {
    /// Reserve pairing the two assets in either orientation, `None` if absent
    async fn fetch_reserve(
        &self,
        asset_in: &ChainAssetId,
        asset_out: &ChainAssetId,
    ) -> Result<Option<AaveReserveState>, QuoteError>;
}
