//! Stableswap State Types

use async_trait::async_trait;
use exchange_core::types::serde_balance;
use exchange_core::{Balance, BlockNumber, ChainAssetId, Permill, QuoteError};
use serde::{Deserialize, Serialize};

/// Balance of one constituent asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserve {
    pub asset: ChainAssetId,
    #[serde(with = "serde_balance")]
    pub amount: Balance,
    pub decimals: u8,
}

/// Pool snapshot at `current_block`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableswapPoolState {
    /// Share asset of the pool
    pub pool_asset: ChainAssetId,
    pub reserves: Vec<PoolReserve>,
    pub initial_amplification: u128,
    pub final_amplification: u128,
    pub initial_block: BlockNumber,
    pub final_block: BlockNumber,
    pub current_block: BlockNumber,
    pub fee: Permill,
    #[serde(with = "serde_balance")]
    pub share_issuance: Balance,
}

impl StableswapPoolState {
    /// Position of a constituent in `reserves`
    pub fn index_of(&self, asset: &ChainAssetId) -> Option<usize> {
        self.reserves.iter().position(|r| &r.asset == asset)
    }

    pub fn is_pool_asset(&self, asset: &ChainAssetId) -> bool {
        &self.pool_asset == asset
    }
}

/// Reads pool info, reserves and share issuance in one snapshot
#[async_trait]
pub trait StableswapStateSource: Send + Sync {
    async fn fetch_pool(&self, pool_asset: &ChainAssetId) -> Result<StableswapPoolState, QuoteError>;
}
