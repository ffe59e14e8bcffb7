//! Market Feed - simulated market-data source
//!
//! Generates random-walk quotes for the listed companies and publishes them
//! on a channel market source:
//! - One company per tick, chosen at random
//! - Price moves by up to `volatility` of itself per tick
//! - Bid/ask straddle the price; volume and exchange ride along as extra fields

use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use trader_core::{Company, CompanyCatalog, MarketTick, Price};
use trader_gateway::ChannelMarketSource;

/// Configuration for the market feed simulation
#[derive(Debug, Clone)]
pub struct MarketFeedConfig {
    /// Companies quoted by the feed
    pub companies: CompanyCatalog,
    /// Starting price of every company
    pub initial_price: Price,
    /// Random-walk step (fraction of price, e.g. 0.01 = up to 1% per tick)
    pub volatility: Decimal,
    /// Half-spread around the price (fraction of price)
    pub half_spread: Decimal,
    /// Name published in the `exchange` field
    pub exchange: String,
}

impl Default for MarketFeedConfig {
    fn default() -> Self {
        Self {
            companies: CompanyCatalog::default(),
            initial_price: dec!(100),
            volatility: dec!(0.01),
            half_spread: dec!(0.005),
            exchange: "compulsive stock exchange".to_string(),
        }
    }
}

/// Generates simulated quotes
pub struct MarketFeedSimulator {
    /// Current price per company name
    prices: BTreeMap<String, Price>,
    config: MarketFeedConfig,
    source: ChannelMarketSource,
    rng: StdRng,
}

impl MarketFeedSimulator {
    /// Create a new feed publishing on `source`
    pub fn new(config: MarketFeedConfig, source: ChannelMarketSource) -> Self {
        Self::from_rng(config, source, rand::SeedableRng::from_entropy())
    }

    /// Create with a specific seed for reproducible simulations
    pub fn with_seed(config: MarketFeedConfig, source: ChannelMarketSource, seed: u64) -> Self {
        Self::from_rng(config, source, rand::SeedableRng::seed_from_u64(seed))
    }

    fn from_rng(config: MarketFeedConfig, source: ChannelMarketSource, rng: StdRng) -> Self {
        let prices = config
            .companies
            .companies()
            .iter()
            .map(|c| (c.name.clone(), config.initial_price))
            .collect();

        Self {
            prices,
            config,
            source,
            rng,
        }
    }

    pub fn source(&self) -> &ChannelMarketSource {
        &self.source
    }

    /// Current price for a company
    pub fn price(&self, company: &str) -> Option<Price> {
        self.prices.get(company).copied()
    }

    /// Generate the next quote without publishing it
    pub fn next_tick(&mut self) -> Option<MarketTick> {
        let companies = self.config.companies.companies();
        if companies.is_empty() {
            return None;
        }
        let company: Company = companies[self.rng.gen_range(0..companies.len())].clone();

        let current = self
            .prices
            .get(&company.name)
            .copied()
            .unwrap_or(self.config.initial_price);

        // Random walk in thousandths: price * (1 + volatility * u), u in [-1, 1]
        let step = Decimal::new(self.rng.gen_range(-1000..=1000), 3);
        let price = (current * (Decimal::ONE + self.config.volatility * step))
            .round_dp(2)
            .max(dec!(0.01));
        self.prices.insert(company.name.clone(), price);

        let half_spread = (price * self.config.half_spread).round_dp(2);
        let volume: u32 = self.rng.gen_range(1..=1000);

        Some(
            MarketTick::new(company.symbol, company.name, price, Utc::now())
                .with_field("exchange", self.config.exchange.clone())
                .with_field("bid", (price - half_spread).to_string())
                .with_field("ask", (price + half_spread).to_string())
                .with_field("volume", volume),
        )
    }

    /// Generate and publish the next quote
    pub fn tick(&mut self) -> Option<MarketTick> {
        let tick = self.next_tick()?;
        // No subscribers is fine
        self.source.publish(tick.clone());
        Some(tick)
    }

    /// Run the feed for a specified number of ticks
    pub async fn run_ticks(&mut self, num_ticks: usize, interval: std::time::Duration) {
        for _ in 0..num_ticks {
            self.tick();
            tokio::time::sleep(interval).await;
        }
    }

    /// Run continuously until cancelled
    pub async fn run(&mut self, interval: std::time::Duration) {
        loop {
            self.tick();
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use trader_ports::MarketSource;

    fn feed(seed: u64) -> MarketFeedSimulator {
        MarketFeedSimulator::with_seed(
            MarketFeedConfig::default(),
            ChannelMarketSource::new("market-data", 64),
            seed,
        )
    }

    #[test]
    fn test_quotes_are_well_formed() {
        let mut feed = feed(42);

        for _ in 0..100 {
            let tick = feed.next_tick().unwrap();
            let catalog = CompanyCatalog::default();
            let company = catalog.find(&tick.name).unwrap();

            assert_eq!(tick.symbol, company.symbol);
            assert!(tick.price > Decimal::ZERO);
            assert!(tick.bid().unwrap() <= tick.price);
            assert!(tick.ask().unwrap() >= tick.price);
            assert_eq!(feed.price(&tick.name), Some(tick.price));
        }
    }

    #[test]
    fn test_random_walk_stays_reasonable() {
        let mut feed = feed(7);

        for _ in 0..100 {
            feed.next_tick();
        }

        for company in CompanyCatalog::default().companies() {
            let price = feed.price(&company.name).unwrap();
            assert!(price > dec!(50) && price < dec!(200), "{} at {}", company.name, price);
        }
    }

    #[test]
    fn test_seeded_feeds_repeat() {
        let mut a = feed(3);
        let mut b = feed(3);
        for _ in 0..10 {
            let (ta, tb) = (a.next_tick().unwrap(), b.next_tick().unwrap());
            assert_eq!((ta.name, ta.price), (tb.name, tb.price));
        }
    }

    #[tokio::test]
    async fn test_tick_publishes() {
        let mut feed = feed(1);
        let mut stream = feed.source().subscribe().await.unwrap();

        let sent = feed.tick().unwrap();
        let received = stream.next().await.unwrap();
        assert_eq!(sent, received);
    }

    #[test]
    fn test_empty_catalog_produces_nothing() {
        let config = MarketFeedConfig {
            companies: CompanyCatalog::new(vec![]),
            ..Default::default()
        };
        let mut feed = MarketFeedSimulator::new(config, ChannelMarketSource::new("md", 4));
        assert!(feed.tick().is_none());
    }
}
