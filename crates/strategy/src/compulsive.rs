//! Compulsive Strategy
//!
//! A deliberately naive trader:
//! - Ignores every tick that is not for its company
//! - On a tick for its company, flips a coin
//! - Heads: buys its share count; tails: sells its share count
//!
//! Ledger rejections (no cash, nothing to sell) are returned as errors and the
//! trader simply tries again on the next tick.

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trader_core::MarketTick;
use trader_ports::StrategyError;

use crate::strategy::{TradeContext, TradingStrategy};

/// Coin-flip trader
pub struct CompulsiveStrategy {
    /// Probability of buying on a matching tick
    buy_probability: f64,
    rng: Mutex<StdRng>,
}

impl CompulsiveStrategy {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create with a specific seed for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            buy_probability: 0.5,
            rng: Mutex::new(rng),
        }
    }

    /// Bias the coin. Clamped to `[0, 1]`.
    pub fn with_buy_probability(mut self, probability: f64) -> Self {
        self.buy_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn flip(&self) -> bool {
        self.rng.lock().gen_bool(self.buy_probability)
    }
}

impl Default for CompulsiveStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradingStrategy for CompulsiveStrategy {
    fn name(&self) -> &str {
        "CompulsiveStrategy"
    }

    async fn on_tick(&self, ctx: &TradeContext, tick: &MarketTick) -> Result<(), StrategyError> {
        if !tick.matches_company(ctx.company()) {
            return Ok(());
        }

        let portfolio = if self.flip() {
            ctx.portfolio().buy(ctx.share_count(), tick).await?
        } else {
            ctx.portfolio().sell(ctx.share_count(), tick).await?
        };

        debug!(
            "{} now holds {} x {} (cash {})",
            ctx.company(),
            portfolio.shares_of(ctx.company()),
            tick.symbol,
            portfolio.cash
        );
        Ok(())
    }
}
