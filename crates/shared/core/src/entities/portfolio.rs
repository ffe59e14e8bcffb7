use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::values::{Price, Quantity};

/// Snapshot of a ledger account: cash plus shares held per company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: Decimal,
    #[serde(default)]
    pub shares: BTreeMap<String, Quantity>,
}

impl Portfolio {
    pub fn with_cash(cash: Decimal) -> Self {
        Self {
            cash,
            shares: BTreeMap::new(),
        }
    }

    /// Shares held for a company (0 if none)
    pub fn shares_of(&self, company: &str) -> Quantity {
        self.shares.get(company).copied().unwrap_or(0)
    }

    /// Cash plus holdings valued at the given per-company prices.
    /// Holdings without a price are valued at zero.
    pub fn value(&self, prices: &BTreeMap<String, Price>) -> Decimal {
        self.shares
            .iter()
            .filter_map(|(company, qty)| prices.get(company).map(|p| *p * Decimal::from(*qty)))
            .fold(self.cash, |acc, v| acc + v)
    }
}
