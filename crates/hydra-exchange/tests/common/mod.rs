//! In-memory doubles for the chain collaborators
//!
//! Shared by the integration scenarios and, through the crate's `fixtures`
//! module, by the unit tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_host::{
    Event, EventCodingPath, EventMatcher, ExecutionFailure, ExecutionSuccess, ExtrinsicBuilder,
    ExtrinsicFee, ExtrinsicFeeEstimator, ReferralStatusCache, ReferralStatusService,
    RuntimeCodingFactory, RuntimeProvider, SigningWrapper, SubmissionMonitor, SubmissionStatus,
    SubmittedExtrinsic,
};
use exchange_core::math::{mul_div_ceil, mul_div_floor};
use exchange_core::{
    AccountId, AtomicOperationArgs, Balance, ChainAssetId, ChainError, ChainId, Direction,
    ExchangeConfig, QuoteArgs, QuoteError, QuoteFactory, RemoteAssetId, SwapLimit,
};
use hydra_exchange::{
    HydraExchangeEdge, HydraExchangeHost, HydraExchangeSwapParamsFactory, OperationQueue,
    PoolComponent,
};

pub const CHAIN: &str = "hydration";

pub fn asset(id: u32) -> ChainAssetId {
    ChainAssetId::new(ChainId::new(CHAIN), id)
}

pub fn account() -> AccountId {
    AccountId([7u8; 32])
}

pub fn omnipool_pool() -> PoolComponent {
    PoolComponent::Omnipool
}

pub fn xyk_pool() -> PoolComponent {
    PoolComponent::Xyk
}

pub fn aave_pool() -> PoolComponent {
    PoolComponent::Aave
}

pub fn stableswap_pool(pool_asset: u32) -> PoolComponent {
    PoolComponent::Stableswap {
        pool_asset: asset(pool_asset),
    }
}

// ─── Runtime ─────────────────────────────────────────────────────────────────

const TRANSFER: (u8, u8) = (10, 2);
const ROUTER_EXECUTED: (u8, u8) = (67, 0);
const ROUTER_ROUTE_EXECUTED: (u8, u8) = (67, 1);
const OMNIPOOL_SELL_EXECUTED: (u8, u8) = (59, 4);
const OMNIPOOL_BUY_EXECUTED: (u8, u8) = (59, 5);

/// Coder with the local asset id as the remote id
pub struct FakeCoder {
    unknown_assets: Vec<ChainAssetId>,
}

impl RuntimeCodingFactory for FakeCoder {
    fn spec_version(&self) -> u32 {
        276
    }

    fn remote_asset_id(&self, asset: &ChainAssetId) -> chain_host::Result<RemoteAssetId> {
        if self.unknown_assets.contains(asset) {
            return Err(ChainError::AssetNotFound {
                asset: asset.to_string(),
            });
        }
        Ok(asset.asset_id)
    }

    fn event_path(&self, event: &Event) -> Option<EventCodingPath> {
        let path = match (event.module_index, event.event_index) {
            TRANSFER => ("Balances", "Transfer"),
            ROUTER_EXECUTED => ("Router", "Executed"),
            ROUTER_ROUTE_EXECUTED => ("Router", "RouteExecuted"),
            OMNIPOOL_SELL_EXECUTED => ("Omnipool", "SellExecuted"),
            OMNIPOOL_BUY_EXECUTED => ("Omnipool", "BuyExecuted"),
            _ => return None,
        };
        Some(EventCodingPath::new(path.0, path.1))
    }
}

fn event(index: (u8, u8), params: serde_json::Value) -> Event {
    Event {
        module_index: index.0,
        event_index: index.1,
        params,
    }
}

pub fn transfer_event(amount: Balance) -> Event {
    event(
        TRANSFER,
        serde_json::json!({ "from": "0x01", "to": "0x02", "amount": amount.to_string() }),
    )
}

pub fn router_executed(amount_in: Balance, amount_out: Balance) -> Event {
    event(
        ROUTER_EXECUTED,
        serde_json::json!({
            "asset_in": 0,
            "asset_out": 1,
            "amount_in": amount_in.to_string(),
            "amount_out": amount_out.to_string(),
        }),
    )
}

pub fn omnipool_sell_executed(amount_in: Balance, amount_out: Balance) -> Event {
    event(
        OMNIPOOL_SELL_EXECUTED,
        serde_json::json!({
            "who": "0x07",
            "amount_in": amount_in.to_string(),
            "amount_out": amount_out.to_string(),
        }),
    )
}

pub fn omnipool_buy_executed(amount_in: Balance, amount_out: Balance) -> Event {
    event(
        OMNIPOOL_BUY_EXECUTED,
        serde_json::json!({
            "who": "0x07",
            "amount_in": amount_in.to_string(),
            "amount_out": amount_out.to_string(),
        }),
    )
}

pub struct FakeRuntime {
    coder: Arc<FakeCoder>,
    fetches: AtomicUsize,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::with_unknown_assets(Vec::new())
    }

    pub fn with_unknown_assets(unknown_assets: Vec<ChainAssetId>) -> Self {
        Self {
            coder: Arc::new(FakeCoder { unknown_assets }),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn coder(&self) -> Arc<FakeCoder> {
        self.coder.clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeProvider for FakeRuntime {
    async fn fetch_coder_factory(&self) -> chain_host::Result<Arc<dyn RuntimeCodingFactory>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.coder.clone())
    }
}

// ─── Extrinsics ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeFeeEstimator {
    paid_in: Mutex<Vec<ChainAssetId>>,
}

impl FakeFeeEstimator {
    pub const FEE: Balance = 1_234_567;

    pub fn paid_in(&self) -> Vec<ChainAssetId> {
        self.paid_in.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtrinsicFeeEstimator for FakeFeeEstimator {
    async fn estimate_fee(
        &self,
        _builder: ExtrinsicBuilder,
        paying_in: &ChainAssetId,
    ) -> chain_host::Result<ExtrinsicFee> {
        self.paid_in.lock().unwrap().push(paying_in.clone());
        Ok(ExtrinsicFee {
            amount: Self::FEE,
            payer: None,
            weight: 350_000_000,
        })
    }
}

pub struct FakeSigner;

impl SigningWrapper for FakeSigner {
    fn account_id(&self) -> AccountId {
        account()
    }

    fn sign(&self, payload: &[u8]) -> chain_host::Result<Vec<u8>> {
        Ok(payload.to_vec())
    }
}

/// Monitor that includes every extrinsic and emits the scripted events
pub struct FakeSubmissionMonitor {
    coder: Arc<FakeCoder>,
    events: Mutex<Vec<Event>>,
    failure: Mutex<Option<ChainError>>,
    submitted: Mutex<Vec<ExtrinsicBuilder>>,
}

impl FakeSubmissionMonitor {
    pub fn new(coder: Arc<FakeCoder>) -> Self {
        Self {
            coder,
            events: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn emit(&self, events: Vec<Event>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn fail_with(&self, error: ChainError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn submitted(&self) -> Vec<ExtrinsicBuilder> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_paths(&self) -> Vec<Vec<String>> {
        self.submitted()
            .iter()
            .map(|builder| builder.calls().iter().map(|c| c.path.to_string()).collect())
            .collect()
    }
}

#[async_trait]
impl SubmissionMonitor for FakeSubmissionMonitor {
    async fn submit_and_monitor(
        &self,
        builder: ExtrinsicBuilder,
        _paying_in: &ChainAssetId,
        signer: Arc<dyn SigningWrapper>,
        matching: Option<EventMatcher>,
    ) -> chain_host::Result<SubmittedExtrinsic> {
        signer.sign(b"payload")?;
        let index = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(builder);
            submitted.len()
        };
        let tx_hash = format!("0x{:064x}", index);

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Ok(SubmittedExtrinsic {
                tx_hash,
                status: SubmissionStatus::Failure(ExecutionFailure {
                    block_hash: Some("0xb1".to_string()),
                    error,
                }),
            });
        }

        let events = self.events.lock().unwrap().clone();
        let interested_events = match matching {
            Some(matcher) => matcher.select(&events, self.coder.as_ref()),
            None => Vec::new(),
        };

        Ok(SubmittedExtrinsic {
            tx_hash,
            status: SubmissionStatus::Success(ExecutionSuccess {
                block_hash: "0xb1".to_string(),
                extrinsic_index: 2,
                interested_events,
            }),
        })
    }
}

// ─── Referral ────────────────────────────────────────────────────────────────

pub struct FakeReferralService {
    referrer: Option<AccountId>,
    fetches: AtomicUsize,
}

impl FakeReferralService {
    pub fn new(referrer: Option<AccountId>) -> Self {
        Self {
            referrer,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferralStatusService for FakeReferralService {
    async fn fetch_linked_referrer(&self, _account: &AccountId) -> chain_host::Result<Option<AccountId>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.referrer)
    }
}

// ─── Quotes ──────────────────────────────────────────────────────────────────

/// Fixed exchange rate: selling `x` gives `x * numerator / denominator`
pub struct StaticQuoteFactory {
    numerator: u128,
    denominator: u128,
    failure: Option<QuoteError>,
}

impl StaticQuoteFactory {
    pub fn ratio(numerator: u128, denominator: u128) -> Arc<dyn QuoteFactory> {
        Arc::new(Self {
            numerator,
            denominator,
            failure: None,
        })
    }

    pub fn failing(error: QuoteError) -> Arc<dyn QuoteFactory> {
        Arc::new(Self {
            numerator: 1,
            denominator: 1,
            failure: Some(error),
        })
    }
}

#[async_trait]
impl QuoteFactory for StaticQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let quoted = match args.direction {
            Direction::Sell => mul_div_floor(args.amount, self.numerator, self.denominator),
            Direction::Buy => mul_div_ceil(args.amount, self.denominator, self.numerator),
        };
        quoted.ok_or(QuoteError::Overflow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCall {
    pub label: String,
    pub direction: Direction,
    pub amount: Balance,
}

pub type QuoteLog = Arc<Mutex<Vec<QuoteCall>>>;

/// Records every quote before delegating
pub struct RecordingQuoteFactory {
    label: String,
    inner: Arc<dyn QuoteFactory>,
    log: QuoteLog,
}

#[async_trait]
impl QuoteFactory for RecordingQuoteFactory {
    async fn quote(&self, args: &QuoteArgs) -> Result<Balance, QuoteError> {
        self.log.lock().unwrap().push(QuoteCall {
            label: self.label.clone(),
            direction: args.direction,
            amount: args.amount,
        });
        self.inner.quote(args).await
    }
}

// ─── Environment ─────────────────────────────────────────────────────────────

/// One account on one chain with every collaborator faked
pub struct TestEnv {
    pub chain_id: ChainId,
    pub host: Arc<HydraExchangeHost>,
    pub runtime: Arc<FakeRuntime>,
    pub fee_estimator: Arc<FakeFeeEstimator>,
    pub monitor: Arc<FakeSubmissionMonitor>,
    pub referral_service: Arc<FakeReferralService>,
    pub referral: Arc<ReferralStatusCache>,
    pub quotes: QuoteLog,
}

impl TestEnv {
    /// Hydration account without a referrer
    pub fn new() -> Self {
        Self::build(CHAIN, None)
    }

    pub fn already_linked() -> Self {
        Self::build(CHAIN, Some(AccountId([9u8; 32])))
    }

    pub fn on_chain(chain: &str) -> Self {
        Self::build(chain, None)
    }

    fn build(chain: &str, referrer: Option<AccountId>) -> Self {
        let chain_id = ChainId::new(chain);
        let config = ExchangeConfig::default();
        let runtime = Arc::new(FakeRuntime::new());
        let fee_estimator = Arc::new(FakeFeeEstimator::default());
        let monitor = Arc::new(FakeSubmissionMonitor::new(runtime.coder()));
        let referral_service = Arc::new(FakeReferralService::new(referrer));
        let referral = Arc::new(ReferralStatusCache::new(referral_service.clone(), account()));
        let params_factory =
            HydraExchangeSwapParamsFactory::new(referral.clone(), config.referral.code.clone());
        let queue = OperationQueue::current().expect("tests run inside a tokio runtime");

        let host = Arc::new(HydraExchangeHost::new(
            chain_id.clone(),
            account(),
            runtime.clone(),
            fee_estimator.clone(),
            monitor.clone(),
            Arc::new(FakeSigner),
            params_factory,
            queue,
            config,
        ));

        Self {
            chain_id,
            host,
            runtime,
            fee_estimator,
            monitor,
            referral_service,
            referral,
            quotes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn asset(&self, id: u32) -> ChainAssetId {
        ChainAssetId::new(self.chain_id.clone(), id)
    }

    pub fn args(&self, swap_limit: SwapLimit) -> AtomicOperationArgs {
        AtomicOperationArgs {
            swap_limit,
            fee_asset: self.asset(0),
        }
    }

    pub fn edge(
        &self,
        origin: u32,
        destination: u32,
        pool: PoolComponent,
        quote_factory: Arc<dyn QuoteFactory>,
    ) -> Arc<HydraExchangeEdge> {
        self.edge_between(self.asset(origin), self.asset(destination), pool, quote_factory)
    }

    pub fn edge_between(
        &self,
        origin: ChainAssetId,
        destination: ChainAssetId,
        pool: PoolComponent,
        quote_factory: Arc<dyn QuoteFactory>,
    ) -> Arc<HydraExchangeEdge> {
        Arc::new(
            HydraExchangeEdge::new(origin, destination, pool, quote_factory, self.host.clone())
                .expect("distinct assets"),
        )
    }

    /// `inner` wrapped so its quotes land in [`quotes`](Self::quotes)
    pub fn recording(&self, label: &str, inner: Arc<dyn QuoteFactory>) -> Arc<dyn QuoteFactory> {
        Arc::new(RecordingQuoteFactory {
            label: label.to_string(),
            inner,
            log: self.quotes.clone(),
        })
    }

    pub fn quote_calls(&self) -> Vec<QuoteCall> {
        self.quotes.lock().unwrap().clone()
    }
}
