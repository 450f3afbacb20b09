//! Core type definitions for the swap engine

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::mul_div_floor;
use crate::Error;

/// On-chain balance in the asset's smallest unit
pub type Balance = u128;

/// Local asset identifier within one chain's asset list
pub type AssetId = u32;

/// Chain-encoded asset identifier (Hydration asset registry id)
pub type RemoteAssetId = u32;

/// Block number
pub type BlockNumber = u32;

/// Chain identifier (genesis hash, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset identifier scoped to a chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainAssetId {
    pub chain_id: ChainId,
    pub asset_id: AssetId,
}

impl ChainAssetId {
    pub fn new(chain_id: ChainId, asset_id: AssetId) -> Self {
        Self { chain_id, asset_id }
    }
}

impl fmt::Display for ChainAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.asset_id)
    }
}

/// Account identifier (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Parse from hex, with or without the `0x` prefix
    pub fn from_hex(value: &str) -> Result<Self, Error> {
        let stripped = value.strip_prefix("0x").unwrap_or(value);
        let bytes = hex::decode(stripped).map_err(|e| Error::InvalidAccountId(e.to_string()))?;
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidAccountId(format!("expected 32 bytes: {}", value)))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

/// Swap direction
///
/// `Sell` fixes the input amount, `Buy` fixes the output amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sell,
    Buy,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Buy => "buy",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parts-per-million fraction, the unit of pallet fee parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permill(u32);

impl Permill {
    pub const ACCURACY: u32 = 1_000_000;

    /// Values above one million are clamped to one.
    pub const fn from_parts(parts: u32) -> Self {
        if parts > Self::ACCURACY {
            Self(Self::ACCURACY)
        } else {
            Self(parts)
        }
    }

    pub const fn from_percent(percent: u32) -> Self {
        Self::from_parts(percent.saturating_mul(10_000))
    }

    pub const fn one() -> Self {
        Self(Self::ACCURACY)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub fn deconstruct(self) -> u32 {
        self.0
    }

    pub fn is_one(self) -> bool {
        self.0 == Self::ACCURACY
    }

    /// `1 - self`
    pub fn complement(self) -> Self {
        Self(Self::ACCURACY - self.0)
    }

    /// `amount * self`, rounded down
    pub fn mul_floor(self, amount: Balance) -> Balance {
        // Cannot exceed `amount`, so it always fits.
        mul_div_floor(amount, self.0 as u128, Self::ACCURACY as u128).unwrap_or(amount)
    }
}

/// Slippage tolerance, a fraction in `[0, 1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSlippage", into = "RawSlippage")]
pub struct Slippage {
    numerator: u64,
    denominator: u64,
}

#[derive(Serialize, Deserialize)]
struct RawSlippage {
    numerator: u64,
    denominator: u64,
}

impl Slippage {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, Error> {
        if denominator == 0 || numerator >= denominator {
            return Err(Error::InvalidSlippage {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn from_percent(percent: u64) -> Result<Self, Error> {
        Self::new(percent, 100)
    }

    pub fn from_permill(permill: u64) -> Result<Self, Error> {
        Self::new(permill, 1_000_000)
    }

    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// `amount * slippage`, rounded down
    pub fn portion_of(&self, amount: Balance) -> Balance {
        // numerator < denominator, so the portion never exceeds `amount`.
        mul_div_floor(amount, self.numerator as u128, self.denominator as u128).unwrap_or(0)
    }

    /// `amount - amount * slippage`; never exceeds `amount`
    pub fn decreasing(&self, amount: Balance) -> Balance {
        amount - self.portion_of(amount)
    }

    /// `amount + amount * slippage`; never below `amount`
    pub fn increasing(&self, amount: Balance) -> Balance {
        amount.saturating_add(self.portion_of(amount))
    }
}

impl TryFrom<RawSlippage> for Slippage {
    type Error = Error;

    fn try_from(raw: RawSlippage) -> Result<Self, Self::Error> {
        Self::new(raw.numerator, raw.denominator)
    }
}

impl From<Slippage> for RawSlippage {
    fn from(slippage: Slippage) -> Self {
        Self {
            numerator: slippage.numerator,
            denominator: slippage.denominator,
        }
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = self.numerator as f64 * 100.0 / self.denominator as f64;
        write!(f, "{:.2}%", percent)
    }
}

/// Amount, direction and slippage bundle governing acceptable execution bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLimit {
    pub direction: Direction,
    #[serde(with = "serde_balance")]
    pub amount_in: Balance,
    #[serde(with = "serde_balance")]
    pub amount_out: Balance,
    pub slippage: Slippage,
}

impl SwapLimit {
    /// Lowest output accepted by a sell
    pub fn min_amount_out(&self) -> Balance {
        self.slippage.decreasing(self.amount_out)
    }

    /// Highest input accepted by a buy
    pub fn max_amount_in(&self) -> Balance {
        self.slippage.increasing(self.amount_in)
    }

    /// The same limit for a different input amount
    ///
    /// A sell keeps its rate, so `amount_out` scales with the new input. A
    /// buy keeps `amount_out` and only moves the input, unless
    /// `replace_buy_with_sell` turns it into a sell at the buy's rate.
    pub fn replacing_amount_in(&self, amount_in: Balance, replace_buy_with_sell: bool) -> Self {
        match (self.direction, replace_buy_with_sell) {
            (Direction::Buy, false) => Self { amount_in, ..*self },
            _ => Self {
                direction: Direction::Sell,
                amount_in,
                amount_out: mul_div_floor(self.amount_out, amount_in, self.amount_in)
                    .unwrap_or(self.amount_out),
                slippage: self.slippage,
            },
        }
    }
}

/// Arguments of one atomic exchange operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicOperationArgs {
    pub swap_limit: SwapLimit,
    /// Asset the transaction fee is paid in; need not be the native asset
    pub fee_asset: ChainAssetId,
}

/// Balances as decimal strings, accepting plain JSON numbers on input
pub mod serde_balance {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::Balance;

    pub fn serialize<S: Serializer>(value: &Balance, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Balance, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n as Balance),
            Repr::Text(text) => match text.strip_prefix("0x") {
                Some(hex) => Balance::from_str_radix(hex, 16).map_err(de::Error::custom),
                None => text.parse::<Balance>().map_err(de::Error::custom),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slippage_rejects_out_of_range() {
        assert!(Slippage::new(1, 0).is_err());
        assert!(Slippage::new(100, 100).is_err());
        assert!(Slippage::from_percent(99).is_ok());
    }

    #[test]
    fn test_slippage_bounds() {
        let slippage = Slippage::from_percent(1).unwrap();
        assert_eq!(slippage.decreasing(1_000), 990);
        assert_eq!(slippage.increasing(1_000), 1_010);

        let zero = Slippage::zero();
        assert_eq!(zero.decreasing(12_345), 12_345);
        assert_eq!(zero.increasing(12_345), 12_345);
    }

    #[test]
    fn test_slippage_bound_invariants_hold_for_all_fractions() {
        let amounts = [0u128, 1, 7, 999, 1_000_000_000_000, u128::MAX / 3, u128::MAX];
        for numerator in [0u64, 1, 5, 50, 99] {
            let slippage = Slippage::new(numerator, 100).unwrap();
            for amount in amounts {
                assert!(slippage.decreasing(amount) <= amount);
                assert!(slippage.increasing(amount) >= amount);
            }
        }
    }

    #[test]
    fn test_slippage_deserialization_validates() {
        let ok: Slippage = serde_json::from_str(r#"{"numerator":1,"denominator":100}"#).unwrap();
        assert_eq!(ok, Slippage::from_percent(1).unwrap());

        let bad = serde_json::from_str::<Slippage>(r#"{"numerator":3,"denominator":2}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_swap_limit_bounds() {
        let limit = SwapLimit {
            direction: Direction::Buy,
            amount_in: 2_000,
            amount_out: 50,
            slippage: Slippage::from_percent(1).unwrap(),
        };
        assert_eq!(limit.max_amount_in(), 2_020);
        assert_eq!(limit.min_amount_out(), 50);
    }

    #[test]
    fn test_replacing_amount_in() {
        let sell = SwapLimit {
            direction: Direction::Sell,
            amount_in: 1_000,
            amount_out: 3_000,
            slippage: Slippage::from_percent(1).unwrap(),
        };
        let replaced = sell.replacing_amount_in(1_100, false);
        assert_eq!(replaced.amount_in, 1_100);
        assert_eq!(replaced.amount_out, 3_300);
        assert_eq!(replaced.slippage, sell.slippage);

        let buy = SwapLimit {
            direction: Direction::Buy,
            ..sell
        };
        let replaced = buy.replacing_amount_in(1_100, false);
        assert_eq!(replaced.direction, Direction::Buy);
        assert_eq!(replaced.amount_in, 1_100);
        assert_eq!(replaced.amount_out, 3_000);

        let as_sell = buy.replacing_amount_in(500, true);
        assert_eq!(as_sell.direction, Direction::Sell);
        assert_eq!(as_sell.amount_out, 1_500);
    }

    #[test]
    fn test_balance_serialized_as_string() {
        let limit = SwapLimit {
            direction: Direction::Sell,
            amount_in: 340_282_366_920_938_463_463_374_607_431_768_211_455,
            amount_out: 1,
            slippage: Slippage::zero(),
        };
        let json = serde_json::to_value(limit).unwrap();
        assert_eq!(
            json["amount_in"],
            "340282366920938463463374607431768211455"
        );

        let parsed: SwapLimit = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, limit);
    }

    #[test]
    fn test_permill() {
        assert_eq!(Permill::from_percent(1).mul_floor(1_000), 10);
        assert_eq!(Permill::from_parts(2_500).mul_floor(1_000_000), 2_500);
        assert_eq!(Permill::from_parts(3_000_000), Permill::one());
        assert_eq!(Permill::from_parts(1).complement().deconstruct(), 999_999);
    }

    #[test]
    fn test_account_id_hex() {
        let hex = "0x".to_string() + &"ab".repeat(32);
        let account = AccountId::from_hex(&hex).unwrap();
        assert_eq!(account.to_string(), hex);
        assert!(AccountId::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_chain_asset_display() {
        let asset = ChainAssetId::new(ChainId::new("hydration"), 5);
        assert_eq!(asset.to_string(), "hydration:5");
    }
}
