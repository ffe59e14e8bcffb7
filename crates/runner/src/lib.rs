//! Trader Runner - compulsive trader orchestration
//!
//! Brings a trader from nothing to a live, callback-driven subscription:
//!
//! - **Controller**: Trader lifecycle and the single-fire startup outcome
//! - **Join**: Fail-fast readiness join over concurrent lookups
//! - **Subscription**: Per-tick dispatch loop invoking the trading strategy
//! - **Market Feed**: Simulated random-walk quotes
//! - **Bootstrap**: In-process trading floor (registry, ledger, feed)
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────┐
//!                    │ TraderController │
//!                    └────────┬─────────┘
//!                             │ connect
//!                             ▼
//!                    ┌──────────────────┐
//!                    │     Registry     │
//!                    └───┬──────────┬───┘
//!           lookup       │          │      lookup
//!      "portfolio"       ▼          ▼      "market-data"
//!             ┌──────────────┐  ┌──────────────┐
//!             │  Portfolio   │  │ Market Source│
//!             └──────┬───────┘  └──────┬───────┘
//!                    └───── join ──────┘
//!                             │ both ready
//!                             ▼
//!                 ┌────────────────────────┐
//!                 │   StreamSubscription   │──► strategy.on_tick(ctx, tick)
//!                 └────────────────────────┘
//! ```

pub mod bootstrap;
pub mod controller;
pub mod join;
pub mod market_feed;
pub mod settings;
pub mod subscription;

// Re-export main types
pub use bootstrap::{BootstrapError, TradingFloor};
pub use controller::{
    StartupOutcome, StartupSignal, TraderController, TraderHandle, TraderReport, TraderState,
};
pub use join::{ReadinessJoin, join_ready};
pub use market_feed::{MarketFeedConfig, MarketFeedSimulator};
pub use settings::{ConfigError, FloorSettings, Settings, TraderSettings};
pub use subscription::{
    DispatchSettings, DispatchStats, StrategyHandler, StreamSubscription, SubscriptionHandle,
    TickHandler,
};

// Re-export strategy types for convenience
pub use trader_strategy::{CompulsiveStrategy, FnStrategy, TradeContext, TradingStrategy};
