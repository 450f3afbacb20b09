//! Atomic exchange operation
//!
//! One atomic operation is one extrinsic: a continuous run of edges of the
//! same family, the swap arguments and the host that will sign and submit it.
//! Everything here returns a [`CompoundOperation`] so callers can chain, join
//! and cancel the work on the host's queue.

use std::sync::Arc;

use chain_host::{
    EventMatcher, ExecutionSuccess, ExtrinsicFee, RuntimeCodingFactory, SubmissionStatus,
};
use exchange_core::{AtomicOperationArgs, Balance, ChainAssetId, ChainId, Direction, SwapLimit};
use serde::Serialize;

use crate::edge::{ExchangeFamily, HydraExchangeEdge};
use crate::errors::{HydraExchangeError, Result};
use crate::host::HydraExchangeHost;
use crate::operation::CompoundOperation;
use crate::params::{CallArgs, HydraExchangeSwapParams, RouteComponent};
use crate::parser;

/// Fee of an operation together with the args it was estimated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetExchangeOperationFee {
    pub extrinsic_fee: ExtrinsicFee,
    pub args: AtomicOperationArgs,
}

#[derive(Clone)]
pub struct HydraExchangeAtomicOperation {
    host: Arc<HydraExchangeHost>,
    edges: Vec<Arc<HydraExchangeEdge>>,
    args: AtomicOperationArgs,
}

impl std::fmt::Debug for HydraExchangeAtomicOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraExchangeAtomicOperation")
            .field("edges", &self.edges)
            .field("args", &self.args)
            .finish()
    }
}

impl HydraExchangeAtomicOperation {
    /// Operation over `edges`, which must be non-empty and continuous
    pub fn new(
        host: Arc<HydraExchangeHost>,
        edges: Vec<Arc<HydraExchangeEdge>>,
        args: AtomicOperationArgs,
    ) -> Result<Self> {
        if edges.is_empty() {
            return Err(HydraExchangeError::NoRoute);
        }
        validate_continuity(&edges)?;

        Ok(Self { host, edges, args })
    }

    pub fn family(&self) -> ExchangeFamily {
        ExchangeFamily::HydraRouter {
            chain_id: self.host.chain_id.clone(),
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.host.chain_id
    }

    // `edges` is never empty past `new`

    pub fn asset_in(&self) -> &ChainAssetId {
        self.edges[0].origin()
    }

    pub fn asset_out(&self) -> &ChainAssetId {
        self.edges[self.edges.len() - 1].destination()
    }

    pub fn edges(&self) -> &[Arc<HydraExchangeEdge>] {
        &self.edges
    }

    pub fn args(&self) -> &AtomicOperationArgs {
        &self.args
    }

    pub fn swap_limit(&self) -> SwapLimit {
        self.args.swap_limit
    }

    /// This operation continued by one more hop
    ///
    /// Direction, input amount and fee asset stay; output amount and
    /// slippage come from `args`. The caller checks that `edge` starts where
    /// this operation ends.
    pub fn extending(&self, edge: Arc<HydraExchangeEdge>, args: &AtomicOperationArgs) -> Self {
        let mut edges = self.edges.clone();
        edges.push(edge);

        let current = self.args.swap_limit;
        let swap_limit = SwapLimit {
            direction: current.direction,
            amount_in: current.amount_in,
            amount_out: args.swap_limit.amount_out,
            slippage: args.swap_limit.slippage,
        };

        Self {
            host: self.host.clone(),
            edges,
            args: AtomicOperationArgs {
                swap_limit,
                fee_asset: self.args.fee_asset.clone(),
            },
        }
    }

    fn route(&self) -> Vec<RouteComponent> {
        self.edges
            .iter()
            .map(|edge| edge.route_component().clone())
            .collect()
    }

    fn call_args(&self, limit: SwapLimit) -> CallArgs {
        CallArgs::new(
            self.asset_in().clone(),
            self.asset_out().clone(),
            self.host.account,
            limit,
        )
    }

    // ---- Parameters ----

    /// Swap params for `limit`, built fresh from the current runtime
    pub fn create_extrinsic_params(
        &self,
        limit: SwapLimit,
    ) -> CompoundOperation<HydraExchangeSwapParams> {
        let call_args = self.call_args(limit);
        let route = self.route();
        let host = self.host.clone();

        CompoundOperation::new(&self.host.queue, async move {
            let coder = host.runtime.fetch_coder_factory().await?;
            host.params_factory
                .create_params(&route, &call_args, coder.as_ref())
                .await
        })
    }

    // ---- Fee ----

    /// Fee of submitting this operation with its own swap limit
    pub fn estimate_fee(&self) -> CompoundOperation<AssetExchangeOperationFee> {
        let host = self.host.clone();
        let args = self.args.clone();

        self.create_extrinsic_params(self.args.swap_limit)
            .then(move |params| async move {
                let builder = params.extrinsic()?;
                let extrinsic_fee = host
                    .fee_estimator
                    .estimate_fee(builder, &args.fee_asset)
                    .await?;

                tracing::debug!(
                    fee = %extrinsic_fee.amount,
                    fee_asset = %args.fee_asset,
                    "Estimated swap fee"
                );

                Ok(AssetExchangeOperationFee {
                    extrinsic_fee,
                    args,
                })
            })
    }

    // ---- Submission ----

    /// Submit and resolve to the output amount the chain reports
    pub fn execute(&self, limit: SwapLimit) -> CompoundOperation<Balance> {
        let host = self.host.clone();
        let fee_asset = self.args.fee_asset.clone();
        let runtime = self.host.runtime.clone();
        let coder = CompoundOperation::new(&self.host.queue, async move {
            Ok(runtime.fetch_coder_factory().await?)
        });

        self.create_extrinsic_params(limit)
            .join(coder)
            .then(move |(params, coder)| async move {
                let success = submit_params(
                    &host,
                    &params,
                    &fee_asset,
                    Some(parser::swap_events_matcher()),
                )
                .await?;

                realized_amount_out(&success, coder.as_ref())
            })
    }

    /// Submit without reading the output amount
    pub fn submit(&self, limit: SwapLimit) -> CompoundOperation<()> {
        let host = self.host.clone();
        let fee_asset = self.args.fee_asset.clone();

        self.create_extrinsic_params(limit)
            .then(move |params| async move {
                submit_params(&host, &params, &fee_asset, None).await?;
                Ok(())
            })
    }

    // ---- Quoting ----

    /// Input needed for the output `amount_out` resolves to
    ///
    /// Walks the edges from the last to the first, each buy quote fed with
    /// the amount the following hop needs.
    pub fn required_amount_to_get_amount_out(
        &self,
        amount_out: CompoundOperation<Balance>,
    ) -> CompoundOperation<Balance> {
        if self.edges.is_empty() {
            return CompoundOperation::with_error(&self.host.queue, HydraExchangeError::NoRoute);
        }

        self.edges.iter().rev().fold(amount_out, |required, edge| {
            let edge = edge.clone();
            required.then(move |amount| async move { edge.quote(amount, Direction::Buy).await })
        })
    }

    pub fn required_amount_in(&self, amount_out: Balance) -> CompoundOperation<Balance> {
        let amount_out = CompoundOperation::with_result(&self.host.queue, amount_out);
        self.required_amount_to_get_amount_out(amount_out)
    }

    /// Output for `amount_in`, each sell quote fed with the previous hop's output
    pub fn expected_amount_out(&self, amount_in: Balance) -> CompoundOperation<Balance> {
        let queue = &self.host.queue;
        if self.edges.is_empty() {
            return CompoundOperation::with_error(queue, HydraExchangeError::NoRoute);
        }

        self.edges
            .iter()
            .fold(CompoundOperation::with_result(queue, amount_in), |received, edge| {
                let edge = edge.clone();
                received.then(move |amount| async move {
                    edge.quote(amount, Direction::Sell).await
                })
            })
    }
}

pub(crate) fn validate_continuity(edges: &[Arc<HydraExchangeEdge>]) -> Result<()> {
    for pair in edges.windows(2) {
        if pair[0].destination() != pair[1].origin() {
            return Err(HydraExchangeError::DiscontinuousRoute {
                expected: pair[0].destination().to_string(),
                found: pair[1].origin().to_string(),
            });
        }
    }
    Ok(())
}

async fn submit_params(
    host: &HydraExchangeHost,
    params: &HydraExchangeSwapParams,
    fee_asset: &ChainAssetId,
    matching: Option<EventMatcher>,
) -> Result<ExecutionSuccess> {
    let builder = params.extrinsic()?;
    let submitted = host
        .submission_monitor
        .submit_and_monitor(builder, fee_asset, host.signer.clone(), matching)
        .await?;

    match submitted.status {
        SubmissionStatus::Success(success) => {
            tracing::info!(
                tx_hash = %submitted.tx_hash,
                block = %success.block_hash,
                "Swap extrinsic executed"
            );
            if params.bundles_referral() {
                host.params_factory.referral().mark_linked().await;
            }
            Ok(success)
        }
        SubmissionStatus::Failure(failure) => {
            tracing::warn!("Swap extrinsic {} failed: {}", submitted.tx_hash, failure.error);
            Err(failure.error.into())
        }
    }
}

fn realized_amount_out(
    success: &ExecutionSuccess,
    coder: &dyn RuntimeCodingFactory,
) -> Result<Balance> {
    match parser::extract_amount_out(&success.interested_events, coder) {
        Some(amount_out) => {
            tracing::info!(amount_out = %amount_out, "Swap output observed on chain");
            Ok(amount_out)
        }
        None => {
            tracing::warn!(
                "No swap completion event in {} reported events",
                success.interested_events.len()
            );
            Err(HydraExchangeError::NoEventsInResult)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use exchange_core::Slippage;

    fn limit(direction: Direction, amount_in: Balance, amount_out: Balance) -> SwapLimit {
        SwapLimit {
            direction,
            amount_in,
            amount_out,
            slippage: Slippage::from_percent(1).unwrap(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_new_rejects_discontinuous_edges() {
        let env = TestEnv::new();
        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));
        let cd = env.edge(3, 4, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));

        let err = HydraExchangeAtomicOperation::new(
            env.host.clone(),
            vec![ab, cd],
            env.args(limit(Direction::Sell, 10, 10)),
        )
        .unwrap_err();

        assert_eq!(
            err,
            HydraExchangeError::DiscontinuousRoute {
                expected: asset(2).to_string(),
                found: asset(3).to_string(),
            }
        );

        let err = HydraExchangeAtomicOperation::new(
            env.host.clone(),
            vec![],
            env.args(limit(Direction::Sell, 10, 10)),
        )
        .unwrap_err();
        assert_eq!(err, HydraExchangeError::NoRoute);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_extending_merges_args() {
        let env = TestEnv::new();
        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));
        let bc = env.edge(2, 3, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));

        let operation = ab.begin_operation(env.args(limit(Direction::Sell, 100, 90))).unwrap();
        let mut next = env.args(SwapLimit {
            direction: Direction::Buy,
            amount_in: 5,
            amount_out: 80,
            slippage: Slippage::from_percent(2).unwrap(),
        });
        next.fee_asset = asset(9);

        let extended = bc.append_to_operation(&operation, next).unwrap();
        let merged = extended.swap_limit();

        assert_eq!(extended.edges().len(), 2);
        assert_eq!(extended.asset_in(), &asset(1));
        assert_eq!(extended.asset_out(), &asset(3));
        assert_eq!(merged.direction, Direction::Sell);
        assert_eq!(merged.amount_in, 100);
        assert_eq!(merged.amount_out, 80);
        assert_eq!(merged.slippage, Slippage::from_percent(2).unwrap());
        assert_eq!(extended.args().fee_asset, operation.args().fee_asset);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_required_amount_walks_edges_backwards() {
        let env = TestEnv::new();
        // A -> B doubles, B -> C triples
        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(2, 1));
        let bc = env.edge(2, 3, omnipool_pool(), StaticQuoteFactory::ratio(3, 1));

        let operation = ab
            .begin_operation(env.args(limit(Direction::Buy, 0, 600)))
            .unwrap();
        let operation = bc
            .append_to_operation(&operation, env.args(limit(Direction::Buy, 0, 600)))
            .unwrap();

        let required = operation.required_amount_in(600).run().await.unwrap();
        // 600 C needs 200 B needs 100 A
        assert_eq!(required, 100);

        let expected = operation.expected_amount_out(100).run().await.unwrap();
        assert_eq!(expected, 600);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_estimate_fee_pays_in_fee_asset() {
        let env = TestEnv::new();
        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));
        let mut args = env.args(limit(Direction::Sell, 1_000, 990));
        args.fee_asset = asset(7);

        let fee = ab.begin_operation(args.clone()).unwrap().estimate_fee().run().await.unwrap();

        assert_eq!(fee.args, args);
        assert_eq!(fee.extrinsic_fee.amount, FakeFeeEstimator::FEE);
        assert_eq!(env.fee_estimator.paid_in(), vec![asset(7)]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_execution_failure_propagates_chain_error() {
        let env = TestEnv::new();
        let error = exchange_core::ChainError::Execution {
            message: "Router.TradingLimitReached".into(),
        };
        env.monitor.fail_with(error.clone());

        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));
        let operation = ab.begin_operation(env.args(limit(Direction::Sell, 10, 10))).unwrap();

        let err = operation.execute(operation.swap_limit()).run().await.unwrap_err();
        assert_eq!(err, HydraExchangeError::Chain(error));
        assert_eq!(env.referral.cached().await, Some(false));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_marks_referral_linked() {
        let env = TestEnv::new();
        let ab = env.edge(1, 2, omnipool_pool(), StaticQuoteFactory::ratio(1, 1));
        let operation = ab.begin_operation(env.args(limit(Direction::Sell, 10, 10))).unwrap();

        operation.submit(operation.swap_limit()).run().await.unwrap();
        assert_eq!(env.referral.cached().await, Some(true));

        operation.submit(operation.swap_limit()).run().await.unwrap();
        let submitted = env.monitor.submitted_paths();
        assert_eq!(submitted[0], vec!["Referrals.link_code", "Omnipool.sell"]);
        assert_eq!(submitted[1], vec!["Omnipool.sell"]);
    }
}
