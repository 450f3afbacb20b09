//! Omnipool State Types

use async_trait::async_trait;
use exchange_core::types::serde_balance;
use exchange_core::{Balance, ChainAssetId, Permill, QuoteError};
use serde::{Deserialize, Serialize};

/// Fee pair charged by the Omnipool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmnipoolFees {
    /// Charged on the output leg, read from the output asset
    pub asset_fee: Permill,
    /// Charged on the hub leg, read from the input asset
    pub protocol_fee: Permill,
}

/// Reserves of one asset inside the Omnipool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmnipoolAssetState {
    #[serde(with = "serde_balance")]
    pub hub_reserve: Balance,
    /// Pool account balance of the asset
    #[serde(with = "serde_balance")]
    pub reserve: Balance,
    /// Dynamic fees, when the fee pallet tracks the asset
    #[serde(default)]
    pub fees: Option<OmnipoolFees>,
}

/// Snapshot of both sides of a trade
///
/// A side is `None` when the asset is not listed in the Omnipool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OmnipoolPairState {
    pub asset_in: Option<OmnipoolAssetState>,
    pub asset_out: Option<OmnipoolAssetState>,
}

/// Reads Omnipool storage for a pair of local assets
#[async_trait]
pub trait OmnipoolStateSource: Send + Sync {
    async fn fetch_pair_state(
        &self,
        asset_in: &ChainAssetId,
        asset_out: &ChainAssetId,
    ) -> Result<OmnipoolPairState, QuoteError>;

    /// Minimum fees from runtime constants, used when an asset has no dynamic fee entry
    async fn default_fees(&self) -> Result<OmnipoolFees, QuoteError>;
}
