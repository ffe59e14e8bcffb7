//! Logical service names

/// Names under which the trader's dependencies are published
///
/// Lookups compare names ignoring ASCII case, so these are canonical spellings
/// rather than exact keys.
pub struct ServiceNames;

impl ServiceNames {
    /// Portfolio ledger (RPC proxy)
    pub const PORTFOLIO: &'static str = "portfolio";

    /// Market-data feed (stream source)
    pub const MARKET_DATA: &'static str = "market-data";
}
