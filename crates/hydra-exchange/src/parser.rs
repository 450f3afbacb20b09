//! Swap result parser
//!
//! The realized output of a swap comes from the chain, never from the quote.
//! Multi-hop routes emit one completion event per hop; only the last one
//! carries the end-to-end output.

use chain_host::{Event, EventCodingPath, EventMatcher, RuntimeCodingFactory};
use exchange_core::types::serde_balance;
use exchange_core::Balance;
use serde::Deserialize;

/// Completion events a Hydration swap may emit
pub fn swap_event_paths() -> Vec<EventCodingPath> {
    vec![
        EventCodingPath::new("Router", "Executed"),
        EventCodingPath::new("Router", "RouteExecuted"),
        EventCodingPath::new("Omnipool", "SellExecuted"),
        EventCodingPath::new("Omnipool", "BuyExecuted"),
    ]
}

pub fn swap_events_matcher() -> EventMatcher {
    EventMatcher::new(swap_event_paths())
}

/// Fields shared by router and omnipool completion events
#[derive(Debug, Deserialize)]
struct SwapExecuted {
    #[serde(with = "serde_balance")]
    amount_out: Balance,
}

/// `amount_out` of the last swap completion event, `None` if there is none
///
/// Events off the allow-list are skipped. If the last completion event cannot
/// be decoded the result is `None` too; earlier hops are never used instead.
pub fn extract_amount_out(events: &[Event], coder: &dyn RuntimeCodingFactory) -> Option<Balance> {
    let matcher = swap_events_matcher();

    let (event, path) = events.iter().rev().find_map(|event| {
        coder
            .event_path(event)
            .filter(|path| matcher.matches(path))
            .map(|path| (event, path))
    })?;

    match serde_json::from_value::<SwapExecuted>(event.params.clone()) {
        Ok(parsed) => Some(parsed.amount_out),
        Err(e) => {
            tracing::warn!("Failed to decode {} event: {}", path, e);
            None
        }
    }
}
