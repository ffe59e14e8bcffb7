//! Bootstrap - trading floor setup
//!
//! Wires the in-process services a trader depends on:
//! - Publishing the portfolio ledger and the market-data stream in a registry
//! - Funding the ledger account
//! - Picking a company and share count for every new trader

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use trader_core::{InvalidTraderConfig, ServiceKind, ServiceRecord, TraderConfig};
use trader_gateway::{ChannelMarketSource, GatewayError, LocalPortfolio, LocalRegistry};
use trader_ports::ServiceHandle;
use trader_strategy::TradingStrategy;

use crate::controller::{StartupSignal, TraderController, TraderHandle};
use crate::market_feed::{MarketFeedConfig, MarketFeedSimulator};
use crate::settings::Settings;

/// Trading floor setup errors
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to publish service: {0}")]
    Publish(#[from] GatewayError),

    #[error("Invalid trader configuration: {0}")]
    TraderConfig(#[from] InvalidTraderConfig),
}

/// Registry, ledger and feed shared by every trader on the floor
pub struct TradingFloor {
    settings: Settings,
    registry: LocalRegistry,
    ledger: LocalPortfolio,
    market: ChannelMarketSource,
    feed: MarketFeedSimulator,
    rng: StdRng,
}

impl TradingFloor {
    /// Build the floor and publish its services under the configured names
    pub fn new(settings: Settings) -> Result<Self, BootstrapError> {
        let registry = LocalRegistry::new();
        let ledger = LocalPortfolio::new(settings.floor.initial_cash);
        let market = ChannelMarketSource::new(
            settings.trader.market_data_service.clone(),
            settings.floor.channel_capacity,
        );

        registry.publish(
            ServiceRecord::new(settings.trader.portfolio_service.clone(), ServiceKind::RpcProxy)
                .with_metadata("backend", "local-ledger"),
            ServiceHandle::Portfolio(Arc::new(ledger.clone())),
        )?;
        registry.publish(
            ServiceRecord::new(
                settings.trader.market_data_service.clone(),
                ServiceKind::StreamSource,
            )
            .with_metadata("backend", "broadcast"),
            ServiceHandle::MarketSource(Arc::new(market.clone())),
        )?;

        let feed_config = MarketFeedConfig {
            companies: settings.trader.companies.clone(),
            initial_price: settings.floor.initial_price,
            volatility: settings.floor.volatility,
            ..Default::default()
        };
        let (feed, rng) = match settings.floor.seed {
            Some(seed) => (
                MarketFeedSimulator::with_seed(feed_config, market.clone(), seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (
                MarketFeedSimulator::new(feed_config, market.clone()),
                StdRng::from_entropy(),
            ),
        };

        info!(
            "Trading floor ready: {} companies, ledger cash {}",
            settings.trader.companies.len(),
            settings.floor.initial_cash
        );

        Ok(Self {
            settings,
            registry,
            ledger,
            market,
            feed,
            rng,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &LocalRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &LocalPortfolio {
        &self.ledger
    }

    pub fn market(&self) -> &ChannelMarketSource {
        &self.market
    }

    pub fn feed_mut(&mut self) -> &mut MarketFeedSimulator {
        &mut self.feed
    }

    /// Pick a company and share count for the next trader
    pub fn next_config(&mut self) -> Result<TraderConfig, InvalidTraderConfig> {
        TraderConfig::pick(
            &mut self.rng,
            &self.settings.trader.companies,
            self.settings.trader.max_shares,
        )
    }

    /// Build a trader bound to this floor's registry
    pub fn trader(
        &mut self,
        strategy: Arc<dyn TradingStrategy>,
    ) -> Result<TraderController, BootstrapError> {
        let config = self.next_config()?;
        Ok(TraderController::new(
            config,
            Arc::new(self.registry.clone()),
            strategy,
            self.settings.trader.clone(),
        ))
    }

    /// Build a trader and start it on its own task
    pub fn spawn_trader(
        &mut self,
        strategy: Arc<dyn TradingStrategy>,
    ) -> Result<(TraderHandle, StartupSignal), BootstrapError> {
        Ok(self.trader(strategy)?.spawn())
    }

    /// Run the market feed for `duration` at the configured tick interval
    pub async fn run_feed(&mut self, duration: Duration) {
        let interval = self.settings.floor.tick_interval();
        let _ = tokio::time::timeout(duration, self.feed.run(interval)).await;
    }
}
