use async_trait::async_trait;
use rust_decimal::Decimal;
use trader_core::{MarketTick, Portfolio, Quantity};

use crate::error::PortfolioError;

/// Port for the remote portfolio ledger
///
/// Handles are stateless proxies: one may be shared by many traders.
/// Call semantics (accounting rules, consistency) belong to the ledger.
#[async_trait]
pub trait PortfolioService: Send + Sync {
    /// Buy `amount` shares of the company quoted by `quote`
    async fn buy(&self, amount: Quantity, quote: &MarketTick) -> Result<Portfolio, PortfolioError>;

    /// Sell `amount` shares of the company quoted by `quote`
    async fn sell(&self, amount: Quantity, quote: &MarketTick)
    -> Result<Portfolio, PortfolioError>;

    /// Current positions
    async fn positions(&self) -> Result<Portfolio, PortfolioError>;

    /// Total value (cash plus holdings at last known prices)
    async fn evaluate(&self) -> Result<Decimal, PortfolioError>;
}
