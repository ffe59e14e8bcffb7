//! Market data tick

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::values::{Price, Symbol, Timestamp};

/// One quote published on the market-data stream
///
/// `extra` carries whatever else the feed publishes (bid, ask, volume, ...)
/// untouched, for strategies that care about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    pub symbol: Symbol,
    /// Company name
    pub name: String,
    pub price: Price,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarketTick {
    pub fn new(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        price: Price,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            timestamp,
            extra: Map::new(),
        }
    }

    /// Attach a pass-through field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether this tick quotes the given company (by name or symbol, ASCII case-insensitive)
    pub fn matches_company(&self, company: &str) -> bool {
        self.name.eq_ignore_ascii_case(company) || self.symbol.eq_ignore_ascii_case(company)
    }

    /// Read a pass-through field as a decimal.
    ///
    /// Accepts JSON numbers and numeric strings.
    pub fn decimal_field(&self, key: &str) -> Option<Decimal> {
        match self.extra.get(key)? {
            Value::String(s) => Decimal::from_str(s).ok(),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Decimal::from(i))
                } else {
                    n.as_f64().and_then(Decimal::from_f64_retain)
                }
            }
            _ => None,
        }
    }

    pub fn bid(&self) -> Option<Decimal> {
        self.decimal_field("bid")
    }

    pub fn ask(&self) -> Option<Decimal> {
        self.decimal_field("ask")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_matches_company() {
        let tick = MarketTick::new("MCH", "MacroHard", dec!(100), Utc::now());
        assert!(tick.matches_company("macrohard"));
        assert!(tick.matches_company("mch"));
        assert!(!tick.matches_company("Divinator"));
    }

    #[test]
    fn test_decimal_fields() {
        let tick = MarketTick::new("DVN", "Divinator", dec!(50), Utc::now())
            .with_field("bid", "49.5")
            .with_field("ask", 51)
            .with_field("volume", "lots");

        assert_eq!(tick.bid(), Some(dec!(49.5)));
        assert_eq!(tick.ask(), Some(dec!(51)));
        assert_eq!(tick.decimal_field("volume"), None);
        assert_eq!(tick.decimal_field("missing"), None);
    }

    #[test]
    fn test_extra_fields_pass_through_json() {
        let json = r#"{
            "symbol": "BCT",
            "name": "Black Coat",
            "price": "12.5",
            "timestamp": "2024-01-01T00:00:00Z",
            "exchange": "vert.x stock exchange",
            "volume": 1000
        }"#;
        let tick: MarketTick = serde_json::from_str(json).unwrap();

        assert_eq!(tick.price, dec!(12.5));
        assert_eq!(tick.extra["exchange"], "vert.x stock exchange");
        assert_eq!(tick.extra["volume"], 1000);
    }
}
