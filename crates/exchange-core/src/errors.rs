//! Error types for the swap engine

use thiserror::Error;

/// Core errors that can occur outside of a running exchange operation
#[derive(Debug, Error)]
pub enum Error {
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid slippage {numerator}/{denominator}: must be in [0, 1)")]
    InvalidSlippage { numerator: u64, denominator: u64 },

    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Pool quoting errors
///
/// The taxonomy is shared by every pool family; each family only produces
/// the variants that make sense for its math.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Pool state unavailable: {reason}")]
    PoolStateUnavailable { reason: String },

    #[error("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[error("Remote asset not found: {asset}")]
    RemoteAssetNotFound { asset: String },

    #[error("Quote calculation failed: {message}")]
    CalculationFailed { message: String },

    #[error("Arithmetic overflow in quote")]
    Overflow,

    #[error("Pair {asset_in} -> {asset_out} is not tradable in this pool")]
    UnsupportedPair { asset_in: String, asset_out: String },
}

/// Chain, runtime and signing errors reported by external collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Asset not found: {asset}")]
    AssetNotFound { asset: String },

    #[error("Runtime metadata mismatch: {message}")]
    MetadataMismatch { message: String },

    #[error("Signing failed: {message}")]
    Signing { message: String },

    #[error("Extrinsic submission failed: {message}")]
    Submission { message: String },

    #[error("Extrinsic execution failed: {message}")]
    Execution { message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Failed to decode chain data: {message}")]
    Decoding { message: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

impl QuoteError {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PoolStateUnavailable { .. } => "pool_state_unavailable",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::RemoteAssetNotFound { .. } => "remote_asset_not_found",
            Self::CalculationFailed { .. } => "quote_calculation_failed",
            Self::Overflow => "quote_overflow",
            Self::UnsupportedPair { .. } => "unsupported_pair",
        }
    }
}

impl ChainError {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AssetNotFound { .. } => "asset_not_found",
            Self::MetadataMismatch { .. } => "metadata_mismatch",
            Self::Signing { .. } => "signing_failed",
            Self::Submission { .. } => "submission_failed",
            Self::Execution { .. } => "execution_failed",
            Self::Connection { .. } => "connection_error",
            Self::Decoding { .. } => "decoding_failed",
        }
    }

    /// Whether the same request may succeed if issued again later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}
