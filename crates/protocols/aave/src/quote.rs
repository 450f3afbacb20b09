//! Money market quote factory

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{Balance, QuoteArgs, QuoteError, QuoteFactory};

use crate::calculator::{calculate_supply, calculate_withdraw};
use crate::state::AaveStateSource;

pub struct AaveQuoteFactory {
    source: Arc<dyn AaveStateSource>,
}

impl AaveQuoteFactory {
    pub fn new(source: Arc<dyn AaveStateSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl QuoteFactory for AaveQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        let reserve = self
            .source
            .fetch_reserve(&args.asset_in, &args.asset_out)
            .await?
            .ok_or_else(|| QuoteError::PoolStateUnavailable {
                reason: format!("no money market reserve for {}", args.asset_in),
            })?;

        tracing::debug!(
            "Money market {} quote, available liquidity {}",
            reserve.underlying,
            reserve.available_liquidity
        );

        // Rate is 1:1, so sell and buy quote the same amount
        if args.asset_in == reserve.underlying && args.asset_out == reserve.atoken {
            calculate_supply(&reserve, args.amount)
        } else if args.asset_in == reserve.atoken && args.asset_out == reserve.underlying {
            calculate_withdraw(&reserve, args.amount)
        } else {
            Err(QuoteError::UnsupportedPair {
                asset_in: args.asset_in.to_string(),
                asset_out: args.asset_out.to_string(),
            })
        }
    }
}
