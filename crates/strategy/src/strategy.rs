//! Strategy Trait and Context
//!
//! Defines the per-tick callback boundary between the trader's dispatch loop
//! and a trading heuristic.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use trader_core::{MarketTick, Quantity, TraderConfig};
use trader_ports::{PortfolioService, StrategyError};

/// Everything a strategy is bound to, fixed when the trader subscribes
#[derive(Clone)]
pub struct TradeContext {
    company: String,
    share_count: Quantity,
    portfolio: Arc<dyn PortfolioService>,
}

impl TradeContext {
    pub fn new(config: &TraderConfig, portfolio: Arc<dyn PortfolioService>) -> Self {
        Self {
            company: config.company().to_string(),
            share_count: config.share_count(),
            portfolio,
        }
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn share_count(&self) -> Quantity {
        self.share_count
    }

    pub fn portfolio(&self) -> &Arc<dyn PortfolioService> {
        &self.portfolio
    }
}

impl fmt::Debug for TradeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeContext")
            .field("company", &self.company)
            .field("share_count", &self.share_count)
            .finish_non_exhaustive()
    }
}

/// Strategy trait - implement this for your trading heuristic
///
/// `on_tick` runs on the trader's dispatch loop: the next tick is not
/// delivered until it returns, so it must be bounded. Long work belongs on
/// a separate task. Errors are logged by the loop and never stop it.
#[async_trait]
pub trait TradingStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Called once per tick, in arrival order
    async fn on_tick(&self, ctx: &TradeContext, tick: &MarketTick) -> Result<(), StrategyError>;
}
