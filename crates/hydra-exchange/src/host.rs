//! Chain host shared by every edge and operation of one chain

use std::sync::Arc;

use chain_host::{ExtrinsicFeeEstimator, RuntimeProvider, SigningWrapper, SubmissionMonitor};
use exchange_core::{AccountId, ChainId, ExchangeConfig};

use crate::operation::OperationQueue;
use crate::params::HydraExchangeSwapParamsFactory;

/// Connection, account and services of the selected Hydration account
///
/// Read-only once built; edges and operations hold it behind an `Arc`.
pub struct HydraExchangeHost {
    pub chain_id: ChainId,
    pub account: AccountId,
    pub runtime: Arc<dyn RuntimeProvider>,
    pub fee_estimator: Arc<dyn ExtrinsicFeeEstimator>,
    pub submission_monitor: Arc<dyn SubmissionMonitor>,
    pub signer: Arc<dyn SigningWrapper>,
    pub params_factory: HydraExchangeSwapParamsFactory,
    pub queue: OperationQueue,
    pub config: ExchangeConfig,
}

impl HydraExchangeHost {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain_id: ChainId,
        account: AccountId,
        runtime: Arc<dyn RuntimeProvider>,
        fee_estimator: Arc<dyn ExtrinsicFeeEstimator>,
        submission_monitor: Arc<dyn SubmissionMonitor>,
        signer: Arc<dyn SigningWrapper>,
        params_factory: HydraExchangeSwapParamsFactory,
        queue: OperationQueue,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            chain_id,
            account,
            runtime,
            fee_estimator,
            submission_monitor,
            signer,
            params_factory,
            queue,
            config,
        }
    }
}
