//! Exchange graph: multi-hop path search over every pool family
//!
//! Finds acyclic paths between two assets, ranks them with the edge
//! weighting heuristic so routes staying in one pool family come first, and
//! quotes the best candidates to pick the route.

use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroU64;
use std::sync::Arc;

use exchange_core::{Balance, ChainAssetId, Direction, ExchangeConfig, RoutingConfig};

use crate::edge::HydraExchangeEdge;
use crate::errors::HydraExchangeError;
use crate::operation::{CompoundOperation, OperationQueue};
use crate::route::{quote_route, AssetExchangeRoute};
use crate::weight;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

pub type ExchangePath = Vec<Arc<HydraExchangeEdge>>;

/// A path with its accumulated weight
#[derive(Debug, Clone)]
pub struct WeightedPath {
    pub edges: ExchangePath,
    pub weight: u64,
}

/// Adjacency-list exchange graph keyed by origin asset
pub struct HydraExchangeGraph {
    adjacency: HashMap<ChainAssetId, Vec<Arc<HydraExchangeEdge>>>,
    routing: RoutingConfig,
    merging_divider: NonZeroU64,
    queue: OperationQueue,
    edge_count: usize,
}

impl HydraExchangeGraph {
    pub fn new(queue: OperationQueue, config: &ExchangeConfig) -> exchange_core::Result<Self> {
        config.validate()?;

        Ok(Self {
            adjacency: HashMap::new(),
            routing: config.routing.clone(),
            merging_divider: config.weights.merging_divider()?,
            queue,
            edge_count: 0,
        })
    }

    pub fn add_edge(&mut self, edge: Arc<HydraExchangeEdge>) {
        self.adjacency
            .entry(edge.origin().clone())
            .or_default()
            .push(edge);
        self.edge_count += 1;
    }

    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = Arc<HydraExchangeEdge>>) {
        for edge in edges {
            self.add_edge(edge);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn edges_from(&self, asset: &ChainAssetId) -> &[Arc<HydraExchangeEdge>] {
        self.adjacency.get(asset).map(Vec::as_slice).unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Path finding
    // -----------------------------------------------------------------------

    /// All acyclic paths from `source` to `target` of at most `max_hops` edges
    ///
    /// BFS with visited-asset tracking, so no asset appears twice in a path.
    pub fn find_paths(&self, source: &ChainAssetId, target: &ChainAssetId) -> Vec<ExchangePath> {
        let max_hops = self.routing.max_hops;
        let mut results: Vec<ExchangePath> = Vec::new();

        type SearchState = (ChainAssetId, ExchangePath, HashSet<ChainAssetId>);
        let mut queue: VecDeque<SearchState> = VecDeque::new();

        if source == target {
            return results;
        }

        let mut initial_visited = HashSet::new();
        initial_visited.insert(source.clone());
        queue.push_back((source.clone(), Vec::new(), initial_visited));

        while let Some((current, path, visited)) = queue.pop_front() {
            for edge in self.edges_from(&current) {
                if edge.destination() == target {
                    let mut complete_path = path.clone();
                    complete_path.push(edge.clone());
                    results.push(complete_path);
                } else if path.len() + 1 < max_hops && !visited.contains(edge.destination()) {
                    let mut new_visited = visited.clone();
                    new_visited.insert(edge.destination().clone());
                    let mut new_path = path.clone();
                    new_path.push(edge.clone());
                    queue.push_back((edge.destination().clone(), new_path, new_visited));
                }
            }
        }

        results
    }

    /// Weight of a path under the merging heuristic
    pub fn path_weight(&self, path: &[Arc<HydraExchangeEdge>]) -> u64 {
        let mut total = 0u64;
        let mut predecessor = None;
        for edge in path {
            total = weight::adding_weight(
                total,
                predecessor,
                edge.edge_type(),
                edge.weight(),
                self.merging_divider,
            );
            predecessor = Some(edge.edge_type());
        }
        total
    }

    /// Paths ranked by ascending weight, at most `max_quote_paths` of them
    ///
    /// Ties keep the BFS order, so shorter paths come first.
    pub fn find_weighted_paths(
        &self,
        source: &ChainAssetId,
        target: &ChainAssetId,
    ) -> Vec<WeightedPath> {
        let mut paths: Vec<WeightedPath> = self
            .find_paths(source, target)
            .into_iter()
            .map(|edges| WeightedPath {
                weight: self.path_weight(&edges),
                edges,
            })
            .collect();

        paths.sort_by_key(|path| path.weight);
        paths.truncate(self.routing.max_quote_paths);
        paths
    }

    // -----------------------------------------------------------------------
    // Best route
    // -----------------------------------------------------------------------

    /// Quote the candidate paths in parallel and keep the best one
    ///
    /// Best is the highest output for a sell and the lowest input for a buy.
    /// Candidates whose quote fails are skipped; if all fail, the first
    /// failure is returned.
    pub fn find_best_route(
        &self,
        source: &ChainAssetId,
        target: &ChainAssetId,
        amount: Balance,
        direction: Direction,
    ) -> CompoundOperation<AssetExchangeRoute> {
        let candidates = self.find_weighted_paths(source, target);
        if candidates.is_empty() {
            tracing::debug!("No path from {} to {}", source, target);
            return CompoundOperation::with_error(&self.queue, HydraExchangeError::NoRoute);
        }

        let quotes: Vec<_> = candidates
            .into_iter()
            .map(|candidate| quote_route(&self.queue, candidate.edges, amount, direction))
            .collect();

        CompoundOperation::new(&self.queue, async move {
            let results =
                futures::future::join_all(quotes.into_iter().map(|quote| quote.run())).await;

            let mut best: Option<AssetExchangeRoute> = None;
            let mut first_error = None;

            for result in results {
                match result {
                    Ok(route) => {
                        let better = match &best {
                            None => true,
                            Some(current) => match direction {
                                Direction::Sell => route.amount_out() > current.amount_out(),
                                Direction::Buy => route.amount_in() < current.amount_in(),
                            },
                        };
                        if better {
                            best = Some(route);
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Candidate route quote failed: {}", e);
                        first_error.get_or_insert(e);
                    }
                }
            }

            match (best, first_error) {
                (Some(route), _) => Ok(route),
                (None, Some(e)) => Err(e),
                (None, None) => Err(HydraExchangeError::NoRoute),
            }
        })
    }
}
