use serde::{Deserialize, Serialize};

use crate::values::Symbol;

/// A company listed on the market-data feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Company {
    /// Display name, carried as `name` on every quote
    pub name: String,
    /// Ticker symbol, carried as `symbol` on every quote
    pub symbol: Symbol,
}

impl Company {
    pub fn new(name: impl Into<String>, symbol: impl Into<Symbol>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Fixed catalog of companies a trader may pick from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyCatalog {
    companies: Vec<Company>,
}

impl CompanyCatalog {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Look up a company by name or symbol (ASCII case-insensitive)
    pub fn find(&self, key: &str) -> Option<&Company> {
        self.companies
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(key) || c.symbol.eq_ignore_ascii_case(key))
    }
}

impl Default for CompanyCatalog {
    fn default() -> Self {
        Self::new(vec![
            Company::new("Divinator", "DVN"),
            Company::new("MacroHard", "MCH"),
            Company::new("Black Coat", "BCT"),
        ])
    }
}
