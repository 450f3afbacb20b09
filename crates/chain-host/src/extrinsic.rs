//! Extrinsic fee estimation, signing and submission seams

use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::types::serde_balance;
use exchange_core::{AccountId, Balance, ChainAssetId, ChainError};
use serde::{Deserialize, Serialize};

use crate::runtime::{Event, EventCodingPath, RuntimeCall, RuntimeCodingFactory};
use crate::Result;

/// Ordered list of calls that end up in one extrinsic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtrinsicBuilder {
    calls: Vec<RuntimeCall>,
}

impl ExtrinsicBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adding(mut self, call: RuntimeCall) -> Self {
        self.calls.push(call);
        self
    }

    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Fee quoted for an extrinsic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrinsicFee {
    #[serde(with = "serde_balance")]
    pub amount: Balance,
    /// Account paying the fee; `None` means the submitting account
    #[serde(default)]
    pub payer: Option<AccountId>,
    pub weight: u64,
}

#[async_trait]
pub trait ExtrinsicFeeEstimator: Send + Sync {
    async fn estimate_fee(
        &self,
        builder: ExtrinsicBuilder,
        paying_in: &ChainAssetId,
    ) -> Result<ExtrinsicFee>;
}

/// Signing capability of the selected account
pub trait SigningWrapper: Send + Sync {
    fn account_id(&self) -> AccountId;

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

/// Allow-list of event paths a submission should report back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMatcher {
    paths: Vec<EventCodingPath>,
}

impl EventMatcher {
    pub fn new(paths: Vec<EventCodingPath>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[EventCodingPath] {
        &self.paths
    }

    pub fn matches(&self, path: &EventCodingPath) -> bool {
        self.paths.contains(path)
    }

    /// Keep the events whose resolved path is on the allow-list, in order
    pub fn select(&self, events: &[Event], coder: &dyn RuntimeCodingFactory) -> Vec<Event> {
        events
            .iter()
            .filter(|event| {
                coder
                    .event_path(event)
                    .is_some_and(|path| self.matches(&path))
            })
            .cloned()
            .collect()
    }
}

/// Extrinsic included and dispatched successfully
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSuccess {
    pub block_hash: String,
    pub extrinsic_index: u32,
    /// Events selected by the submission's matcher, in emission order
    pub interested_events: Vec<Event>,
}

/// Extrinsic included but dispatch failed
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionFailure {
    pub block_hash: Option<String>,
    pub error: ChainError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
    Success(ExecutionSuccess),
    Failure(ExecutionFailure),
}

/// Outcome of submit-and-monitor
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedExtrinsic {
    pub tx_hash: String,
    pub status: SubmissionStatus,
}

impl SubmittedExtrinsic {
    pub fn is_success(&self) -> bool {
        matches!(self.status, SubmissionStatus::Success(_))
    }
}

/// Signs, submits and follows an extrinsic until it is included
#[async_trait]
pub trait SubmissionMonitor: Send + Sync {
    /// `matching` selects the events reported in `ExecutionSuccess`;
    /// with `None` no events are reported.
    async fn submit_and_monitor(
        &self,
        builder: ExtrinsicBuilder,
        paying_in: &ChainAssetId,
        signer: Arc<dyn SigningWrapper>,
        matching: Option<EventMatcher>,
    ) -> Result<SubmittedExtrinsic>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::CallCodingPath;
    use exchange_core::RemoteAssetId;

    struct IndexCoder;

    impl RuntimeCodingFactory for IndexCoder {
        fn spec_version(&self) -> u32 {
            1
        }

        fn remote_asset_id(&self, asset: &ChainAssetId) -> Result<RemoteAssetId> {
            Ok(asset.asset_id)
        }

        fn event_path(&self, event: &Event) -> Option<EventCodingPath> {
            match (event.module_index, event.event_index) {
                (1, 0) => Some(EventCodingPath::new("Omnipool", "SellExecuted")),
                (2, 0) => Some(EventCodingPath::new("Tokens", "Transfer")),
                _ => None,
            }
        }
    }

    fn event(module_index: u8, event_index: u8) -> Event {
        Event {
            module_index,
            event_index,
            params: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_builder_preserves_call_order() {
        let first = RuntimeCall {
            path: CallCodingPath::new("Referrals", "link_code"),
            args: serde_json::Value::Null,
        };
        let second = RuntimeCall {
            path: CallCodingPath::new("Router", "sell"),
            args: serde_json::Value::Null,
        };
        let builder = ExtrinsicBuilder::new()
            .adding(first.clone())
            .adding(second.clone());
        assert_eq!(builder.calls(), &[first, second]);
    }

    #[test]
    fn test_matcher_selects_allowed_events_only() {
        let matcher = EventMatcher::new(vec![EventCodingPath::new("Omnipool", "SellExecuted")]);
        let events = vec![event(2, 0), event(1, 0), event(9, 9), event(1, 0)];
        let selected = matcher.select(&events, &IndexCoder);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|e| e.module_index == 1));
    }
}
