//! Hydration Exchange Routing
//!
//! Multi-hop swaps across the Hydration pool families (Omnipool, Stableswap,
//! XYK, Aave). Edges quote single hops, the graph finds and ranks paths,
//! quoted routes are cut into atomic operations, and every atomic operation
//! becomes one extrinsic whose realized output is read back from the chain.

#[cfg(test)]
extern crate self as hydra_exchange;

pub mod atomic;
pub mod edge;
pub mod errors;
pub mod graph;
pub mod host;
pub mod operation;
pub mod params;
pub mod parser;
pub mod route;
pub mod weight;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixtures;

// Re-exports
pub use atomic::{AssetExchangeOperationFee, HydraExchangeAtomicOperation};
pub use edge::{EdgeType, ExchangeFamily, HydraExchangeEdge};
pub use errors::{HydraExchangeError, Result};
pub use graph::{ExchangePath, HydraExchangeGraph, WeightedPath};
pub use host::HydraExchangeHost;
pub use operation::{CancellationFlag, CompoundOperation, OperationQueue};
pub use params::{
    CallArgs, HydraExchangeSwapParams, HydraExchangeSwapParamsFactory, HydraSwapCall,
    PoolComponent, RemotePoolType, RemoteTrade, RouteComponent,
};
pub use parser::{extract_amount_out, swap_event_paths, swap_events_matcher};
pub use route::{
    estimate_route_fee, prepare_atomic_operations, quote_route, submit_single_operation,
    AssetExchangeFee, AssetExchangeRoute, RouteItem,
};
pub use weight::adding_weight;
