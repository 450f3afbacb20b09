//! Edge weighting for route search
//!
//! Two consecutive hops of the same pool family may collapse into one call,
//! so the second one only costs a fraction of the suggested weight.

use std::num::NonZeroU64;

use crate::edge::EdgeType;

/// Weight after traversing an edge of `edge_type` reached from `predecessor`
///
/// Pure in its inputs; the divider comes from configuration.
pub fn adding_weight(
    current_weight: u64,
    predecessor: Option<EdgeType>,
    edge_type: EdgeType,
    suggested_edge_weight: u64,
    merging_divider: NonZeroU64,
) -> u64 {
    let contribution = match predecessor {
        Some(previous) if previous == edge_type => suggested_edge_weight / merging_divider.get(),
        _ => suggested_edge_weight,
    };

    current_weight.saturating_add(contribution)
}
