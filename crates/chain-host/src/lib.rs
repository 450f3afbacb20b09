//! chain-host: In-process interfaces to the chain collaborators
//!
//! The swap engine never talks to a node directly. It consumes:
//!
//! - a runtime provider that hands out the current coding factory
//!   (asset id conversion, event path resolution),
//! - an extrinsic fee estimator and a submit-and-monitor service,
//! - a signer,
//! - a referral-status service, wrapped here in a single-flight cache.
//!
//! Implementations live in the embedding wallet; tests use in-memory fakes.

pub mod extrinsic;
pub mod referral;
pub mod runtime;

pub use extrinsic::{
    EventMatcher, ExecutionFailure, ExecutionSuccess, ExtrinsicBuilder, ExtrinsicFee,
    ExtrinsicFeeEstimator, SigningWrapper, SubmissionMonitor, SubmissionStatus,
    SubmittedExtrinsic,
};
pub use referral::{ReferralStatusCache, ReferralStatusService};
pub use runtime::{
    CallCodingPath, Event, EventCodingPath, RuntimeCall, RuntimeCodingFactory, RuntimeProvider,
};

/// Result type for chain collaborator calls
pub type Result<T> = std::result::Result<T, exchange_core::ChainError>;
