//! Configuration types for the swap engine

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

use crate::Error;

/// Edge weighting used by route search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Weight suggested for a single hop
    #[serde(default = "default_edge_weight")]
    pub default_edge_weight: u64,

    /// Divides the weight of a hop that follows a hop of the same pool family
    #[serde(default = "default_merging_divider")]
    pub merging_edges_weight_divider: u64,
}

fn default_edge_weight() -> u64 {
    100
}

fn default_merging_divider() -> u64 {
    2
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            default_edge_weight: default_edge_weight(),
            merging_edges_weight_divider: default_merging_divider(),
        }
    }
}

impl WeightConfig {
    pub fn merging_divider(&self) -> Result<NonZeroU64, Error> {
        NonZeroU64::new(self.merging_edges_weight_divider).ok_or_else(|| {
            Error::Config("merging_edges_weight_divider must be greater than zero".to_string())
        })
    }
}

/// Referral linkage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralConfig {
    /// Code linked on the user's first swap
    #[serde(default = "default_referral_code")]
    pub code: String,
}

fn default_referral_code() -> String {
    "NOVA".to_string()
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            code: default_referral_code(),
        }
    }
}

/// Route search limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    #[serde(default = "default_max_quote_paths")]
    pub max_quote_paths: usize,
}

fn default_max_hops() -> usize {
    4
}

fn default_max_quote_paths() -> usize {
    4
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_quote_paths: default_max_quote_paths(),
        }
    }
}

/// Exchange engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub weights: WeightConfig,

    #[serde(default)]
    pub referral: ReferralConfig,

    #[serde(default)]
    pub routing: RoutingConfig,
}

impl ExchangeConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.weights.merging_divider()?;

        if self.routing.max_hops == 0 {
            return Err(Error::Config("max_hops must be greater than zero".to_string()));
        }
        if self.routing.max_quote_paths == 0 {
            return Err(Error::Config(
                "max_quote_paths must be greater than zero".to_string(),
            ));
        }
        if self.referral.code.trim().is_empty() {
            return Err(Error::Config("referral code must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExchangeConfig::default();
        assert_eq!(config.weights.default_edge_weight, 100);
        assert_eq!(config.weights.merging_edges_weight_divider, 2);
        assert_eq!(config.referral.code, "NOVA");
        assert_eq!(config.routing.max_hops, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ExchangeConfig::from_json_str(r#"{"weights":{"merging_edges_weight_divider":5}}"#)
                .unwrap();
        assert_eq!(config.weights.merging_edges_weight_divider, 5);
        assert_eq!(config.weights.default_edge_weight, 100);
        assert_eq!(config.routing, RoutingConfig::default());
    }

    #[test]
    fn test_zero_divider_rejected() {
        let result =
            ExchangeConfig::from_json_str(r#"{"weights":{"merging_edges_weight_divider":0}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = ExchangeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ExchangeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
