//! XYK quote factory

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{Balance, Direction, QuoteArgs, QuoteError, QuoteFactory};

use crate::calculator::{calculate_input, calculate_output, calculate_price_impact};
use crate::state::XykStateSource;

pub struct XykQuoteFactory {
    source: Arc<dyn XykStateSource>,
}

impl XykQuoteFactory {
    pub fn new(source: Arc<dyn XykStateSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl QuoteFactory for XykQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        let reserves = self
            .source
            .fetch_reserves(&args.asset_in, &args.asset_out)
            .await?
            .ok_or_else(|| QuoteError::PoolStateUnavailable {
                reason: format!("no XYK pool for {} / {}", args.asset_in, args.asset_out),
            })?;
        let fee = self.source.trade_fee().await?;

        let (amount_in, amount_out) = match args.direction {
            Direction::Sell => {
                let out =
                    calculate_output(reserves.reserve_in, reserves.reserve_out, args.amount, fee)?;
                (args.amount, out)
            }
            Direction::Buy => {
                let input =
                    calculate_input(reserves.reserve_in, reserves.reserve_out, args.amount, fee)?;
                (input, args.amount)
            }
        };

        let impact =
            calculate_price_impact(reserves.reserve_in, reserves.reserve_out, amount_in, amount_out);
        if impact > 10.0 {
            tracing::warn!(
                "High price impact {:.2}% on XYK {} -> {}",
                impact,
                args.asset_in,
                args.asset_out
            );
        }

        Ok(match args.direction {
            Direction::Sell => amount_out,
            Direction::Buy => amount_in,
        })
    }
}
