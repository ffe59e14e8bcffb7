//! Trader Ports
//!
//! Port definitions (traits) for the compulsive trader.
//! These define the boundaries between the trader's orchestration logic and
//! the services it discovers at runtime: the registry, the portfolio ledger
//! and the market-data stream.

mod discovery;
mod error;
mod market;
mod portfolio;

pub use discovery::{Discovery, ServiceHandle, ServiceLocator};
pub use error::{PortfolioError, StrategyError, TraderError, TraderResult};
pub use market::{MarketSource, TickStream};
pub use portfolio::PortfolioService;
