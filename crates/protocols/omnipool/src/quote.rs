//! Omnipool quote factory

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{Balance, Direction, QuoteArgs, QuoteError, QuoteFactory};

use crate::calculator::{calculate_buy, calculate_sell};
use crate::state::OmnipoolStateSource;

/// Quotes any pair of Omnipool assets
pub struct OmnipoolQuoteFactory {
    source: Arc<dyn OmnipoolStateSource>,
}

impl OmnipoolQuoteFactory {
    pub fn new(source: Arc<dyn OmnipoolStateSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl QuoteFactory for OmnipoolQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        let (pair, defaults) = futures::join!(
            self.source.fetch_pair_state(&args.asset_in, &args.asset_out),
            self.source.default_fees(),
        );
        let pair = pair?;
        let defaults = defaults?;

        let asset_in = pair
            .asset_in
            .ok_or_else(|| QuoteError::RemoteAssetNotFound {
                asset: args.asset_in.to_string(),
            })?;
        let asset_out = pair
            .asset_out
            .ok_or_else(|| QuoteError::RemoteAssetNotFound {
                asset: args.asset_out.to_string(),
            })?;

        // Asset fee belongs to the output asset, protocol fee to the input asset
        let asset_fee = asset_out
            .fees
            .map(|f| f.asset_fee)
            .unwrap_or(defaults.asset_fee);
        let protocol_fee = asset_in
            .fees
            .map(|f| f.protocol_fee)
            .unwrap_or(defaults.protocol_fee);

        let amount = match args.direction {
            Direction::Sell => {
                calculate_sell(args.amount, &asset_in, &asset_out, asset_fee, protocol_fee)?
            }
            Direction::Buy => {
                calculate_buy(args.amount, &asset_in, &asset_out, asset_fee, protocol_fee)?
            }
        };

        tracing::debug!(
            "Omnipool quote {} -> {} ({}): {} => {}",
            args.asset_in,
            args.asset_out,
            args.direction,
            args.amount,
            amount
        );

        Ok(amount)
    }
}
