//! Route quoting and composition
//!
//! A quoted route records the amounts flowing through every hop. Sell routes
//! are quoted front to back from the input amount; buy routes back to front
//! from the desired output. The quoted route is then cut into atomic
//! operations, each edge first offered to the operation built so far.
//!
//! The route fee holds the fee of every operation plus what the fees of the
//! later operations cost in the route's input asset, since those are paid
//! out of the intermediate assets the swap itself produces.

use std::sync::Arc;

use exchange_core::{
    AtomicOperationArgs, Balance, ChainAssetId, Direction, QuoteError, Slippage, SwapLimit,
};

use crate::atomic::{validate_continuity, AssetExchangeOperationFee, HydraExchangeAtomicOperation};
use crate::edge::HydraExchangeEdge;
use crate::errors::{HydraExchangeError, Result};
use crate::operation::{CompoundOperation, OperationQueue};

/// One quoted hop
#[derive(Debug, Clone)]
pub struct RouteItem {
    pub edge: Arc<HydraExchangeEdge>,
    pub amount_in: Balance,
    pub amount_out: Balance,
}

/// A continuous path with the amounts quoted for each hop
#[derive(Debug, Clone)]
pub struct AssetExchangeRoute {
    items: Vec<RouteItem>,
    direction: Direction,
}

impl AssetExchangeRoute {
    pub fn new(items: Vec<RouteItem>, direction: Direction) -> Result<Self> {
        if items.is_empty() {
            return Err(HydraExchangeError::NoRoute);
        }
        let edges: Vec<_> = items.iter().map(|item| item.edge.clone()).collect();
        validate_continuity(&edges)?;

        Ok(Self { items, direction })
    }

    pub fn items(&self) -> &[RouteItem] {
        &self.items
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn amount_in(&self) -> Balance {
        self.items.first().map_or(0, |item| item.amount_in)
    }

    pub fn amount_out(&self) -> Balance {
        self.items.last().map_or(0, |item| item.amount_out)
    }

    pub fn asset_in(&self) -> Option<&ChainAssetId> {
        self.items.first().map(|item| item.edge.origin())
    }

    pub fn asset_out(&self) -> Option<&ChainAssetId> {
        self.items.last().map(|item| item.edge.destination())
    }
}

/// Quote `path` for `amount` in (sell) or `amount` out (buy)
///
/// Each hop is a unit on `queue` depending on the hop quoted before it.
pub fn quote_route(
    queue: &OperationQueue,
    path: Vec<Arc<HydraExchangeEdge>>,
    amount: Balance,
    direction: Direction,
) -> CompoundOperation<AssetExchangeRoute> {
    if path.is_empty() {
        return CompoundOperation::with_error(queue, HydraExchangeError::NoRoute);
    }
    if let Err(e) = validate_continuity(&path) {
        return CompoundOperation::with_error(queue, e);
    }

    let hops = path.len();
    let start = CompoundOperation::with_result(queue, (Vec::with_capacity(hops), amount));

    let quoted = match direction {
        Direction::Sell => path.into_iter().fold(start, |acc, edge| {
            acc.then(move |(mut items, amount_in): (Vec<RouteItem>, Balance)| async move {
                let amount_out = edge.quote(amount_in, Direction::Sell).await?;
                items.push(RouteItem {
                    edge,
                    amount_in,
                    amount_out,
                });
                Ok((items, amount_out))
            })
        }),
        Direction::Buy => path.into_iter().rev().fold(start, |acc, edge| {
            acc.then(move |(mut items, amount_out): (Vec<RouteItem>, Balance)| async move {
                let amount_in = edge.quote(amount_out, Direction::Buy).await?;
                items.push(RouteItem {
                    edge,
                    amount_in,
                    amount_out,
                });
                Ok((items, amount_in))
            })
        }),
    };

    quoted.map(move |(mut items, _)| {
        if direction == Direction::Buy {
            items.reverse();
        }
        let route = AssetExchangeRoute::new(items, direction)?;
        tracing::debug!(
            hops,
            direction = %direction,
            amount_in = %route.amount_in(),
            amount_out = %route.amount_out(),
            "Quoted route"
        );
        Ok(route)
    })
}

/// Cut a quoted route into atomic operations
///
/// Every hop is first offered to the last operation; when it does not
/// continue it, a new operation starts at that hop. The first operation pays
/// fees in `fee_asset`, later ones in their own origin asset.
pub fn prepare_atomic_operations(
    route: &AssetExchangeRoute,
    slippage: Slippage,
    fee_asset: &ChainAssetId,
) -> Result<Vec<HydraExchangeAtomicOperation>> {
    let mut operations: Vec<HydraExchangeAtomicOperation> = Vec::new();

    for item in route.items() {
        let segment_fee_asset = if operations.is_empty() {
            fee_asset.clone()
        } else {
            item.edge.origin().clone()
        };
        let args = AtomicOperationArgs {
            swap_limit: SwapLimit {
                direction: route.direction(),
                amount_in: item.amount_in,
                amount_out: item.amount_out,
                slippage,
            },
            fee_asset: segment_fee_asset,
        };

        let extended = operations
            .last()
            .and_then(|last| item.edge.append_to_operation(last, args.clone()));

        match extended {
            Some(operation) => {
                if let Some(last) = operations.last_mut() {
                    *last = operation;
                }
            }
            None => operations.push(item.edge.begin_operation(args)?),
        }
    }

    Ok(operations)
}

// ---- Route fee ----

/// Fees of every operation of a route
#[derive(Debug, Clone)]
pub struct AssetExchangeFee {
    pub route: AssetExchangeRoute,
    pub operation_fees: Vec<AssetExchangeOperationFee>,
    /// Fees of the second and later operations, priced in the route's input asset
    pub intermediate_fees_in_asset_in: Balance,
    pub slippage: Slippage,
    pub fee_asset: ChainAssetId,
}

impl AssetExchangeFee {
    /// Input the first operation needs to also cover the intermediate fees
    pub fn initial_amount_in(&self) -> Result<Balance> {
        self.route
            .amount_in()
            .checked_add(self.intermediate_fees_in_asset_in)
            .ok_or_else(|| QuoteError::Overflow.into())
    }
}

/// Estimate the fee of every operation of `route` and price the
/// intermediate ones in the route's input asset
pub fn estimate_route_fee(
    queue: &OperationQueue,
    route: AssetExchangeRoute,
    slippage: Slippage,
    fee_asset: ChainAssetId,
) -> CompoundOperation<AssetExchangeFee> {
    let operations = match prepare_atomic_operations(&route, slippage, &fee_asset) {
        Ok(operations) => operations,
        Err(e) => return CompoundOperation::with_error(queue, e),
    };
    let estimates: Vec<_> = operations.iter().map(|operation| operation.estimate_fee()).collect();
    let fees_queue = queue.clone();

    CompoundOperation::new(queue, async move {
        let operation_fees =
            futures::future::try_join_all(estimates.into_iter().map(|estimate| estimate.run()))
                .await?;

        let intermediate_fees_in_asset_in =
            price_intermediate_fees(&fees_queue, &operations, &operation_fees)
                .run()
                .await?;

        tracing::debug!(
            operations = operations.len(),
            intermediate_fees = %intermediate_fees_in_asset_in,
            "Estimated route fee"
        );

        Ok(AssetExchangeFee {
            route,
            operation_fees,
            intermediate_fees_in_asset_in,
            slippage,
            fee_asset,
        })
    })
}

/// Walks the operations from the last to the first. Each operation's fee is
/// added to what the operations after it need, and the sum is turned into
/// the input of the operation before through its reverse quote. The first
/// operation's own fee is not part of the result.
fn price_intermediate_fees(
    queue: &OperationQueue,
    operations: &[HydraExchangeAtomicOperation],
    operation_fees: &[AssetExchangeOperationFee],
) -> CompoundOperation<Balance> {
    if operations.len() != operation_fees.len() {
        return CompoundOperation::with_error(
            queue,
            HydraExchangeError::FeeOperationMismatch {
                fees: operation_fees.len(),
                operations: operations.len(),
            },
        );
    }

    let mut required: Option<CompoundOperation<Balance>> = None;

    for (index, (operation, fee)) in operations.iter().zip(operation_fees).enumerate().rev() {
        let amount_in = match required.take() {
            Some(amount_out) => operation.required_amount_to_get_amount_out(amount_out),
            None => CompoundOperation::with_result(queue, 0),
        };

        if index == 0 {
            required = Some(amount_in);
            continue;
        }

        // Added to an amount of this operation's input asset
        if fee.args.fee_asset != *operation.asset_in() {
            return CompoundOperation::with_error(
                queue,
                HydraExchangeError::FeeAssetMismatch {
                    expected: operation.asset_in().to_string(),
                    found: fee.args.fee_asset.to_string(),
                },
            );
        }

        let fee_amount = fee.extrinsic_fee.amount;
        required = Some(amount_in.map(move |amount| {
            amount
                .checked_add(fee_amount)
                .ok_or_else(|| QuoteError::Overflow.into())
        }));
    }

    required.unwrap_or_else(|| CompoundOperation::with_error(queue, HydraExchangeError::NoRoute))
}

/// Submit a route that composes into exactly one operation
///
/// The swap limit's input is raised to the fee's initial amount in.
pub fn submit_single_operation(
    queue: &OperationQueue,
    fee: &AssetExchangeFee,
) -> CompoundOperation<()> {
    let mut operations = match prepare_atomic_operations(&fee.route, fee.slippage, &fee.fee_asset)
    {
        Ok(operations) => operations,
        Err(e) => return CompoundOperation::with_error(queue, e),
    };
    if operations.len() != 1 {
        return CompoundOperation::with_error(
            queue,
            HydraExchangeError::SingleOperationExpected {
                count: operations.len(),
            },
        );
    }
    let initial_amount_in = match fee.initial_amount_in() {
        Ok(amount) => amount,
        Err(e) => return CompoundOperation::with_error(queue, e),
    };

    let operation = operations.remove(0);
    let limit = operation
        .swap_limit()
        .replacing_amount_in(initial_amount_in, false);

    operation.submit(limit)
}
