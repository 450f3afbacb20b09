//! Stableswap quote factory

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{Balance, ChainAssetId, Direction, QuoteArgs, QuoteError, QuoteFactory};

use crate::calculator;
use crate::state::{StableswapPoolState, StableswapStateSource};

/// Quotes trades inside one stableswap pool, including its share asset
pub struct StableswapQuoteFactory {
    source: Arc<dyn StableswapStateSource>,
    pool_asset: ChainAssetId,
}

impl StableswapQuoteFactory {
    pub fn new(source: Arc<dyn StableswapStateSource>, pool_asset: ChainAssetId) -> Self {
        Self { source, pool_asset }
    }

    pub fn pool_asset(&self) -> &ChainAssetId {
        &self.pool_asset
    }
}

fn constituent(state: &StableswapPoolState, asset: &ChainAssetId) -> Result<usize, QuoteError> {
    state
        .index_of(asset)
        .ok_or_else(|| QuoteError::RemoteAssetNotFound {
            asset: asset.to_string(),
        })
}

fn calculate(state: &StableswapPoolState, args: &QuoteArgs) -> Result<Balance, QuoteError> {
    if args.asset_in == args.asset_out {
        return Err(QuoteError::UnsupportedPair {
            asset_in: args.asset_in.to_string(),
            asset_out: args.asset_out.to_string(),
        });
    }

    if state.is_pool_asset(&args.asset_in) {
        let j = constituent(state, &args.asset_out)?;
        return match args.direction {
            Direction::Sell => calculator::calculate_liquidity_out_one_asset(state, j, args.amount),
            Direction::Buy => calculator::calculate_shares_for_amount(state, j, args.amount),
        };
    }

    if state.is_pool_asset(&args.asset_out) {
        let i = constituent(state, &args.asset_in)?;
        return match args.direction {
            Direction::Sell => calculator::calculate_shares(state, i, args.amount),
            Direction::Buy => calculator::calculate_add_one_asset(state, i, args.amount),
        };
    }

    let i = constituent(state, &args.asset_in)?;
    let j = constituent(state, &args.asset_out)?;
    match args.direction {
        Direction::Sell => calculator::calculate_out_given_in(state, i, j, args.amount),
        Direction::Buy => calculator::calculate_in_given_out(state, i, j, args.amount),
    }
}

#[async_trait]
impl QuoteFactory for StableswapQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        let state = self.source.fetch_pool(&self.pool_asset).await?;
        let amount = calculate(&state, args)?;

        tracing::debug!(
            "Stableswap {} quote {} -> {} ({}): {} => {}",
            self.pool_asset,
            args.asset_in,
            args.asset_out,
            args.direction,
            args.amount,
            amount
        );

        Ok(amount)
    }
}
