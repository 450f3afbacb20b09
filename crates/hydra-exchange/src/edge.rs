//! Exchange edges
//!
//! An edge is one hop between two assets through one pool. Edges are built
//! once when the graph is assembled and shared by reference afterwards.

use std::sync::Arc;

use exchange_core::{
    AtomicOperationArgs, Balance, ChainAssetId, ChainId, Direction, QuoteArgs, QuoteFactory,
};
use serde::{Deserialize, Serialize};

use crate::atomic::HydraExchangeAtomicOperation;
use crate::errors::{HydraExchangeError, Result};
use crate::host::HydraExchangeHost;
use crate::operation::CompoundOperation;
use crate::params::{PoolComponent, RouteComponent};
use crate::weight;

/// Pool family of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Omnipool,
    Stableswap,
    Xyk,
    Aave,
}

impl From<&PoolComponent> for EdgeType {
    fn from(pool: &PoolComponent) -> Self {
        match pool {
            PoolComponent::Omnipool => Self::Omnipool,
            PoolComponent::Stableswap { .. } => Self::Stableswap,
            PoolComponent::Xyk => Self::Xyk,
            PoolComponent::Aave => Self::Aave,
        }
    }
}

/// Which composer an atomic operation belongs to
///
/// Operations only merge with edges of the same family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExchangeFamily {
    /// Everything the Hydration router can execute in one extrinsic
    HydraRouter { chain_id: ChainId },
}

pub struct HydraExchangeEdge {
    origin: ChainAssetId,
    destination: ChainAssetId,
    component: RouteComponent,
    quote_factory: Arc<dyn QuoteFactory>,
    host: Arc<HydraExchangeHost>,
}

impl std::fmt::Debug for HydraExchangeEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraExchangeEdge")
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("pool", &self.component.pool)
            .finish()
    }
}

impl HydraExchangeEdge {
    pub fn new(
        origin: ChainAssetId,
        destination: ChainAssetId,
        pool: PoolComponent,
        quote_factory: Arc<dyn QuoteFactory>,
        host: Arc<HydraExchangeHost>,
    ) -> Result<Self> {
        if origin == destination {
            return Err(HydraExchangeError::InvalidEdge {
                asset: origin.to_string(),
            });
        }

        let component = RouteComponent {
            asset_in: origin.clone(),
            asset_out: destination.clone(),
            pool,
        };

        Ok(Self {
            origin,
            destination,
            component,
            quote_factory,
            host,
        })
    }

    pub fn origin(&self) -> &ChainAssetId {
        &self.origin
    }

    pub fn destination(&self) -> &ChainAssetId {
        &self.destination
    }

    pub fn edge_type(&self) -> EdgeType {
        EdgeType::from(&self.component.pool)
    }

    pub fn route_component(&self) -> &RouteComponent {
        &self.component
    }

    pub fn host(&self) -> &Arc<HydraExchangeHost> {
        &self.host
    }

    pub fn family(&self) -> ExchangeFamily {
        ExchangeFamily::HydraRouter {
            chain_id: self.host.chain_id.clone(),
        }
    }

    /// Output for `amount` in (sell) or input for `amount` out (buy)
    pub async fn quote(&self, amount: Balance, direction: Direction) -> Result<Balance> {
        let args = QuoteArgs {
            asset_in: self.origin.clone(),
            asset_out: self.destination.clone(),
            amount,
            direction,
        };

        self.quote_factory.quote(&args).await.map_err(|e| {
            tracing::warn!(
                "{:?} quote {} -> {} failed: {}",
                self.edge_type(),
                self.origin,
                self.destination,
                e
            );
            HydraExchangeError::from(e)
        })
    }

    /// [`quote`](Self::quote) as a unit on the host's queue
    pub fn quote_operation(
        self: &Arc<Self>,
        amount: Balance,
        direction: Direction,
    ) -> CompoundOperation<Balance> {
        let edge = self.clone();
        CompoundOperation::new(&self.host.queue, async move {
            edge.quote(amount, direction).await
        })
    }

    /// Single-hop operation starting at this edge
    pub fn begin_operation(
        self: &Arc<Self>,
        args: AtomicOperationArgs,
    ) -> Result<HydraExchangeAtomicOperation> {
        HydraExchangeAtomicOperation::new(self.host.clone(), vec![self.clone()], args)
    }

    /// `operation` extended by this edge, or `None` if this edge cannot continue it
    ///
    /// The merged args keep the operation's direction, input amount and fee
    /// asset and take output amount and slippage from `args`.
    pub fn append_to_operation(
        self: &Arc<Self>,
        operation: &HydraExchangeAtomicOperation,
        args: AtomicOperationArgs,
    ) -> Option<HydraExchangeAtomicOperation> {
        match (operation.family(), self.family()) {
            (
                ExchangeFamily::HydraRouter { chain_id: current },
                ExchangeFamily::HydraRouter { chain_id: candidate },
            ) if current == candidate => {
                if operation.asset_out() != &self.origin {
                    return None;
                }
                Some(operation.extending(self.clone(), &args))
            }
            _ => None,
        }
    }

    /// Consecutive hops of one family only need one fee check for the merged call
    pub fn should_ignore_fee_requirement(&self, after: &HydraExchangeEdge) -> bool {
        after.edge_type() == self.edge_type()
    }

    pub fn can_pay_non_native_fees_in_intermediate_position(&self) -> bool {
        true
    }

    pub fn requires_origin_keep_alive_on_intermediate_position(&self) -> bool {
        false
    }

    /// Weight suggested for this edge by configuration
    pub fn weight(&self) -> u64 {
        self.host.config.weights.default_edge_weight
    }

    pub fn adding_weight(
        &self,
        current_weight: u64,
        predecessor: Option<&HydraExchangeEdge>,
    ) -> Result<u64> {
        let divider = self
            .host
            .config
            .weights
            .merging_divider()
            .map_err(|e| HydraExchangeError::OperationFailed {
                message: e.to_string(),
            })?;

        Ok(weight::adding_weight(
            current_weight,
            predecessor.map(|p| p.edge_type()),
            self.edge_type(),
            self.weight(),
            divider,
        ))
    }
}
