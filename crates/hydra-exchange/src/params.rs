//! Swap call parameters
//!
//! Turns a route and a swap limit into the runtime calls of one extrinsic:
//! a pool-native Omnipool call for a single Omnipool hop, the Router call
//! carrying every leg otherwise, and the referral `link_code` call in front
//! while the account has no referrer yet.

use std::sync::Arc;

use chain_host::{
    CallCodingPath, ExtrinsicBuilder, ReferralStatusCache, RuntimeCall, RuntimeCodingFactory,
};
use exchange_core::types::serde_balance;
use exchange_core::{AccountId, Balance, ChainAssetId, Direction, RemoteAssetId, SwapLimit};
use serde::{Deserialize, Serialize};

use crate::errors::{HydraExchangeError, Result};

// ─── Local route description ─────────────────────────────────────────────────

/// Pool a route leg goes through, in local asset ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolComponent {
    Omnipool,
    Stableswap { pool_asset: ChainAssetId },
    Xyk,
    Aave,
}

/// One leg of a route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteComponent {
    pub asset_in: ChainAssetId,
    pub asset_out: ChainAssetId,
    pub pool: PoolComponent,
}

/// Assets, receiver and swap limit of the whole swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgs {
    pub asset_in: ChainAssetId,
    pub asset_out: ChainAssetId,
    pub receiver: AccountId,
    pub limit: SwapLimit,
}

impl CallArgs {
    pub fn new(
        asset_in: ChainAssetId,
        asset_out: ChainAssetId,
        receiver: AccountId,
        limit: SwapLimit,
    ) -> Self {
        Self {
            asset_in,
            asset_out,
            receiver,
            limit,
        }
    }

    pub fn min_amount_out(&self) -> Balance {
        self.limit.min_amount_out()
    }

    pub fn max_amount_in(&self) -> Balance {
        self.limit.max_amount_in()
    }
}

// ─── Remote encoding ─────────────────────────────────────────────────────────

/// Router `PoolType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemotePoolType {
    #[serde(rename = "XYK")]
    Xyk,
    Stableswap(RemoteAssetId),
    Omnipool,
    Aave,
}

/// Router `Trade` leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTrade {
    pub pool: RemotePoolType,
    pub asset_in: RemoteAssetId,
    pub asset_out: RemoteAssetId,
}

/// Convert every leg to chain asset ids
pub fn remote_route(
    components: &[RouteComponent],
    coder: &dyn RuntimeCodingFactory,
) -> Result<Vec<RemoteTrade>> {
    components
        .iter()
        .map(|component| {
            let pool = match &component.pool {
                PoolComponent::Omnipool => RemotePoolType::Omnipool,
                PoolComponent::Stableswap { pool_asset } => {
                    RemotePoolType::Stableswap(coder.remote_asset_id(pool_asset)?)
                }
                PoolComponent::Xyk => RemotePoolType::Xyk,
                PoolComponent::Aave => RemotePoolType::Aave,
            };

            Ok(RemoteTrade {
                pool,
                asset_in: coder.remote_asset_id(&component.asset_in)?,
                asset_out: coder.remote_asset_id(&component.asset_out)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmnipoolSellCall {
    pub asset_in: RemoteAssetId,
    pub asset_out: RemoteAssetId,
    #[serde(with = "serde_balance")]
    pub amount: Balance,
    #[serde(with = "serde_balance")]
    pub min_buy_amount: Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmnipoolBuyCall {
    pub asset_out: RemoteAssetId,
    pub asset_in: RemoteAssetId,
    #[serde(with = "serde_balance")]
    pub amount: Balance,
    #[serde(with = "serde_balance")]
    pub max_sell_amount: Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterSellCall {
    pub asset_in: RemoteAssetId,
    pub asset_out: RemoteAssetId,
    #[serde(with = "serde_balance")]
    pub amount_in: Balance,
    #[serde(with = "serde_balance")]
    pub min_amount_out: Balance,
    pub route: Vec<RemoteTrade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterBuyCall {
    pub asset_in: RemoteAssetId,
    pub asset_out: RemoteAssetId,
    #[serde(with = "serde_balance")]
    pub amount_out: Balance,
    #[serde(with = "serde_balance")]
    pub max_amount_in: Balance,
    pub route: Vec<RemoteTrade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReferralCodeCall {
    pub code: String,
}

impl LinkReferralCodeCall {
    pub fn runtime_call(&self) -> Result<RuntimeCall> {
        encode(CallCodingPath::new("Referrals", "link_code"), self)
    }
}

/// The swap call of an extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydraSwapCall {
    OmnipoolSell(OmnipoolSellCall),
    OmnipoolBuy(OmnipoolBuyCall),
    RouterSell(RouterSellCall),
    RouterBuy(RouterBuyCall),
}

impl HydraSwapCall {
    pub fn path(&self) -> CallCodingPath {
        match self {
            Self::OmnipoolSell(_) => CallCodingPath::new("Omnipool", "sell"),
            Self::OmnipoolBuy(_) => CallCodingPath::new("Omnipool", "buy"),
            Self::RouterSell(_) => CallCodingPath::new("Router", "sell"),
            Self::RouterBuy(_) => CallCodingPath::new("Router", "buy"),
        }
    }

    pub fn runtime_call(&self) -> Result<RuntimeCall> {
        match self {
            Self::OmnipoolSell(call) => encode(self.path(), call),
            Self::OmnipoolBuy(call) => encode(self.path(), call),
            Self::RouterSell(call) => encode(self.path(), call),
            Self::RouterBuy(call) => encode(self.path(), call),
        }
    }
}

fn encode<T: Serialize>(path: CallCodingPath, args: &T) -> Result<RuntimeCall> {
    let args = serde_json::to_value(args).map_err(|e| HydraExchangeError::Encoding {
        message: format!("{}: {}", path, e),
    })?;
    Ok(RuntimeCall { path, args })
}

// ─── Params ──────────────────────────────────────────────────────────────────

/// Everything that goes into one swap extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydraExchangeSwapParams {
    pub swap: HydraSwapCall,
    pub link_referral: Option<LinkReferralCodeCall>,
}

impl HydraExchangeSwapParams {
    pub fn bundles_referral(&self) -> bool {
        self.link_referral.is_some()
    }

    /// Calls in submission order: referral link first, then the swap
    pub fn extrinsic(&self) -> Result<ExtrinsicBuilder> {
        let mut builder = ExtrinsicBuilder::new();
        if let Some(link) = &self.link_referral {
            builder = builder.adding(link.runtime_call()?);
        }
        Ok(builder.adding(self.swap.runtime_call()?))
    }
}

/// Builds swap params, consulting the referral cache on every build
pub struct HydraExchangeSwapParamsFactory {
    referral: Arc<ReferralStatusCache>,
    referral_code: String,
}

impl HydraExchangeSwapParamsFactory {
    pub fn new(referral: Arc<ReferralStatusCache>, referral_code: impl Into<String>) -> Self {
        Self {
            referral,
            referral_code: referral_code.into(),
        }
    }

    pub fn referral(&self) -> &Arc<ReferralStatusCache> {
        &self.referral
    }

    pub async fn create_params(
        &self,
        route: &[RouteComponent],
        args: &CallArgs,
        coder: &dyn RuntimeCodingFactory,
    ) -> Result<HydraExchangeSwapParams> {
        if route.is_empty() {
            return Err(HydraExchangeError::NoRoute);
        }

        let asset_in = coder.remote_asset_id(&args.asset_in)?;
        let asset_out = coder.remote_asset_id(&args.asset_out)?;

        let single_omnipool_hop = route.len() == 1 && route[0].pool == PoolComponent::Omnipool;

        let limit = &args.limit;
        let swap = match (limit.direction, single_omnipool_hop) {
            (Direction::Sell, true) => HydraSwapCall::OmnipoolSell(OmnipoolSellCall {
                asset_in,
                asset_out,
                amount: limit.amount_in,
                min_buy_amount: args.min_amount_out(),
            }),
            (Direction::Buy, true) => HydraSwapCall::OmnipoolBuy(OmnipoolBuyCall {
                asset_out,
                asset_in,
                amount: limit.amount_out,
                max_sell_amount: args.max_amount_in(),
            }),
            (Direction::Sell, false) => HydraSwapCall::RouterSell(RouterSellCall {
                asset_in,
                asset_out,
                amount_in: limit.amount_in,
                min_amount_out: args.min_amount_out(),
                route: remote_route(route, coder)?,
            }),
            (Direction::Buy, false) => HydraSwapCall::RouterBuy(RouterBuyCall {
                asset_in,
                asset_out,
                amount_out: limit.amount_out,
                max_amount_in: args.max_amount_in(),
                route: remote_route(route, coder)?,
            }),
        };

        let link_referral = if self.referral.is_linked().await? {
            None
        } else {
            Some(LinkReferralCodeCall {
                code: self.referral_code.clone(),
            })
        };

        tracing::debug!(
            call = %swap.path(),
            hops = route.len(),
            link_referral = link_referral.is_some(),
            "Built swap params"
        );

        Ok(HydraExchangeSwapParams {
            swap,
            link_referral,
        })
    }
}
