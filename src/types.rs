//! Core data types used across the order engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for order construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("unknown side: {0:?} (expected \"buy\" or \"sell\")")]
    UnknownSide(String),

    #[error("product id must be non-empty")]
    EmptyProductId,

    #[error("quantity must be >= 1")]
    ZeroQuantity,

    #[error("limit price ({price}) must be positive")]
    NonPositiveLimit { price: Price },
}

/// Order direction
///
/// Parses case-insensitively ("buy", "BUY" and "Buy" all accept); the
/// canonical textual form is lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Side::Sell)
        } else {
            Err(OrderValidationError::UnknownSide(s.to_string()))
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Side {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Product identifier using Arc<str> for cheap cloning
///
/// The worker clones the head order on every evaluation cycle, so ids travel
/// constantly. Arc<str> keeps those clones at O(1) instead of reallocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(#[serde(with = "arc_str_serde")] std::sync::Arc<str>);

/// Custom serde for Arc<str>
mod arc_str_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Arc::from(s.as_str()))
    }
}

impl ProductId {
    pub fn new(s: impl AsRef<str>) -> Self {
        ProductId(std::sync::Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Price Type - Exact Decimal Comparison for Limit Checks
// ============================================================================

use rust_decimal::Decimal;
use std::fmt;

/// Price type for exact limit comparisons.
///
/// Wraps `rust_decimal::Decimal` so that an order resting at limit 100 fills
/// at a tick of exactly 100 on both sides, with no floating-point drift at
/// the boundary. The engine only ever compares prices; no arithmetic is
/// exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    /// Create from f64 (boundary input: CSV rows, random feed draws)
    /// Note: This conversion may lose precision for values with many decimal places
    pub fn from_f64(value: f64) -> Self {
        Price(Decimal::try_from(value).unwrap_or_else(|_| {
            // Fallback for extreme values (NaN, Infinity)
            if value.is_nan() || value.is_infinite() {
                Decimal::ZERO
            } else {
                Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
            }
        }))
    }

    /// Check if value is positive
    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Get the underlying Decimal
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Price(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Order
// ============================================================================

/// A resting limit order.
///
/// Immutable once constructed: the fields are private and only readable
/// through accessors, so an order that passed validation stays valid for its
/// whole life in the queue. Build one with [`Order::new`] (validated) or
/// [`Order::new_unchecked`] (trusted input). `Deserialize` is intentionally
/// not derived; it would bypass validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    side: Side,
    product_id: ProductId,
    quantity: u32,
    limit_price: Price,
}

impl Order {
    /// Create a new order with validation
    pub fn new(
        side: Side,
        product_id: ProductId,
        quantity: u32,
        limit_price: Price,
    ) -> Result<Self, OrderValidationError> {
        let order = Self {
            side,
            product_id,
            quantity,
            limit_price,
        };
        order.validate()?;
        Ok(order)
    }

    /// Create an order without validation (for trusted sources or when validation is done separately)
    pub fn new_unchecked(
        side: Side,
        product_id: ProductId,
        quantity: u32,
        limit_price: Price,
    ) -> Self {
        Self {
            side,
            product_id,
            quantity,
            limit_price,
        }
    }

    /// Validate the order data
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.product_id.as_str().is_empty() {
            return Err(OrderValidationError::EmptyProductId);
        }

        if self.quantity == 0 {
            return Err(OrderValidationError::ZeroQuantity);
        }

        if !self.limit_price.is_positive() {
            return Err(OrderValidationError::NonPositiveLimit {
                price: self.limit_price,
            });
        }

        Ok(())
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Maximum acceptable price for a buy, minimum acceptable for a sell
    pub fn limit_price(&self) -> Price {
        self.limit_price
    }

    /// Limit check against a fresh tick: a buy is marketable at or under its
    /// limit, a sell at or over. Equality executes on both sides.
    pub fn is_marketable_at(&self, price: Price) -> bool {
        match self.side {
            Side::Buy => price <= self.limit_price,
            Side::Sell => price >= self.limit_price,
        }
    }
}

#[cfg(test)]
mod order_tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(side: Side, limit: f64) -> Order {
        Order::new(side, ProductId::new("BTCINR"), 10, Price::from_f64(limit)).unwrap()
    }

    #[test]
    fn test_side_parses_case_insensitively() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("BUY".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("Sell".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!("sELL".parse::<Side>().unwrap(), Side::Sell);
    }

    #[test]
    fn test_side_rejects_unknown_text() {
        let err = "hold".parse::<Side>().unwrap_err();
        assert_eq!(err, OrderValidationError::UnknownSide("hold".to_string()));
    }

    #[test]
    fn test_order_rejects_empty_product_id() {
        let result = Order::new(Side::Buy, ProductId::new(""), 10, Price::from_f64(100.0));
        assert_eq!(result.unwrap_err(), OrderValidationError::EmptyProductId);
    }

    #[test]
    fn test_order_rejects_zero_quantity() {
        let result = Order::new(Side::Buy, ProductId::new("123"), 0, Price::from_f64(100.0));
        assert_eq!(result.unwrap_err(), OrderValidationError::ZeroQuantity);
    }

    #[test]
    fn test_order_rejects_non_positive_limit() {
        for bad in [0.0, -5.0] {
            let result = Order::new(Side::Buy, ProductId::new("123"), 10, Price::from_f64(bad));
            assert!(
                matches!(result, Err(OrderValidationError::NonPositiveLimit { .. })),
                "limit {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_new_unchecked_skips_validation() {
        let order = Order::new_unchecked(Side::Sell, ProductId::new(""), 0, Price::from_f64(0.0));
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_buy_marketable_at_or_under_limit() {
        let order = order(Side::Buy, 100.0);
        assert!(order.is_marketable_at(Price::from_f64(99.5)));
        assert!(
            order.is_marketable_at(Price::from_f64(100.0)),
            "boundary equality executes"
        );
        assert!(!order.is_marketable_at(Price::from_f64(100.01)));
    }

    #[test]
    fn test_sell_marketable_at_or_over_limit() {
        let order = order(Side::Sell, 100.0);
        assert!(order.is_marketable_at(Price::from_f64(100.5)));
        assert!(
            order.is_marketable_at(Price::from_f64(100.0)),
            "boundary equality executes"
        );
        assert!(!order.is_marketable_at(Price::from_f64(99.99)));
    }

    #[test]
    fn test_price_comparison_is_exact() {
        // 0.1 + 0.2 style drift must not move the boundary
        let limit = Price::from(dec!(0.3));
        let tick = Price::from_f64(0.3);
        assert_eq!(limit, tick);
    }

    #[test]
    fn test_price_from_f64_extremes_collapse_to_zero() {
        assert!(!Price::from_f64(f64::NAN).is_positive());
        assert!(!Price::from_f64(f64::INFINITY).is_positive());
    }

    #[test]
    fn test_price_serde_round_trip() {
        let price = Price::from_f64(123.456);
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, parsed);
    }

    #[test]
    fn test_side_serde_accepts_any_casing() {
        let side: Side = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, Side::Sell);
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
    }

    #[test]
    fn test_order_serializes_canonically() {
        let order = Order::new(
            Side::Buy,
            ProductId::new("123"),
            1000,
            Price::from_f64(100.0),
        )
        .unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["side"], "buy");
        assert_eq!(json["product_id"], "123");
        assert_eq!(json["quantity"], 1000);
        assert_eq!(json["limit_price"], "100");
    }
}
