//! Closure-backed strategy

use async_trait::async_trait;
use trader_core::MarketTick;
use trader_ports::StrategyError;

use crate::strategy::{TradeContext, TradingStrategy};

/// Adapts a synchronous closure to [`TradingStrategy`]
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&TradeContext, &MarketTick) -> Result<(), StrategyError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> TradingStrategy for FnStrategy<F>
where
    F: Fn(&TradeContext, &MarketTick) -> Result<(), StrategyError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_tick(&self, ctx: &TradeContext, tick: &MarketTick) -> Result<(), StrategyError> {
        (self.f)(ctx, tick)
    }
}
