//! Error types for exchange operations

use exchange_core::{ChainError, QuoteError};
use thiserror::Error;

/// Failures of route composition, quoting and execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydraExchangeError {
    #[error("No route to build the operation from")]
    NoRoute,

    #[error("Swap executed but no swap completion event was found")]
    NoEventsInResult,

    #[error("Route is not continuous: expected a hop from {expected}, found {found}")]
    DiscontinuousRoute { expected: String, found: String },

    #[error("Edge must connect two different assets, got {asset} on both ends")]
    InvalidEdge { asset: String },

    #[error("Got {fees} fee estimates for {operations} operations")]
    FeeOperationMismatch { fees: usize, operations: usize },

    #[error("Intermediate fee must be paid in {expected}, got {found}")]
    FeeAssetMismatch { expected: String, found: String },

    #[error("Expected a single operation, the route needs {count}")]
    SingleOperationExpected { count: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Failed to encode call: {message}")]
    Encoding { message: String },
}

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, HydraExchangeError>;

impl HydraExchangeError {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoRoute => "no_route",
            Self::NoEventsInResult => "no_events_in_result",
            Self::DiscontinuousRoute { .. } => "discontinuous_route",
            Self::InvalidEdge { .. } => "invalid_edge",
            Self::FeeOperationMismatch { .. } => "fee_operation_mismatch",
            Self::FeeAssetMismatch { .. } => "fee_asset_mismatch",
            Self::SingleOperationExpected { .. } => "single_operation_expected",
            Self::Cancelled => "cancelled",
            Self::OperationFailed { .. } => "operation_failed",
            Self::Quote(e) => e.error_code(),
            Self::Chain(e) => e.error_code(),
            Self::Encoding { .. } => "encoding_failed",
        }
    }

    /// Whether the caller may retry the same request after a delay
    ///
    /// Quote failures follow pool state and may clear up; only transient
    /// chain errors are worth retrying. Routing and parsing failures are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Quote(_) => true,
            Self::Chain(e) => e.is_transient(),
            _ => false,
        }
    }
}
