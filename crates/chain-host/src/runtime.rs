//! Runtime metadata seam
//!
//! The coding factory is a snapshot of the chain's current runtime metadata.
//! It is fetched fresh for every operation that encodes calls or decodes
//! events, so a runtime upgrade between quote and submission is picked up.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use exchange_core::{ChainAssetId, RemoteAssetId};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Pallet + event name pair identifying an event kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventCodingPath {
    pub module_name: String,
    pub event_name: String,
}

impl EventCodingPath {
    pub fn new(module_name: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            event_name: event_name.into(),
        }
    }
}

impl fmt::Display for EventCodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module_name, self.event_name)
    }
}

/// Pallet + call name pair identifying a call kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallCodingPath {
    pub module_name: String,
    pub call_name: String,
}

impl CallCodingPath {
    pub fn new(module_name: impl Into<String>, call_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            call_name: call_name.into(),
        }
    }
}

impl fmt::Display for CallCodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module_name, self.call_name)
    }
}

/// Event emitted by an extrinsic
///
/// `params` holds the event arguments as produced by the runtime JSON
/// context (named fields, balances as decimal strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub module_index: u8,
    pub event_index: u8,
    pub params: serde_json::Value,
}

/// Call ready to be added to an extrinsic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeCall {
    pub path: CallCodingPath,
    pub args: serde_json::Value,
}

/// Metadata-backed encoder/decoder for one runtime version
pub trait RuntimeCodingFactory: Send + Sync {
    fn spec_version(&self) -> u32;

    /// Convert a local asset id to the chain's asset registry id
    fn remote_asset_id(&self, asset: &ChainAssetId) -> Result<RemoteAssetId>;

    /// Resolve an event's indices to its pallet and name, `None` if unknown
    fn event_path(&self, event: &Event) -> Option<EventCodingPath>;
}

/// Supplies the coding factory for the current runtime
#[async_trait]
pub trait RuntimeProvider: Send + Sync {
    async fn fetch_coder_factory(&self) -> Result<Arc<dyn RuntimeCodingFactory>>;
}
