//! Trader Strategy Framework
//!
//! The pluggable part of a trader: what to do with each market tick.
//! - `TradingStrategy` trait, invoked once per tick on the dispatch loop
//! - `TradeContext`, the immutable binding of company, share count and ledger
//! - `CompulsiveStrategy`, the built-in coin-flip trader
//! - `FnStrategy`, wrapping a plain closure
//!
//! ## Architecture
//!
//! ```text
//! Market stream ──► dispatch loop ──► TradingStrategy::on_tick(ctx, tick)
//!                                              │
//!                                              ▼ buy / sell / positions
//!                                      PortfolioService (remote ledger)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trader_strategy::{CompulsiveStrategy, TradingStrategy};
//!
//! let strategy = CompulsiveStrategy::with_seed(42);
//! strategy.on_tick(&ctx, &tick).await?;
//! ```

pub mod compulsive;
pub mod function;
pub mod strategy;

// Re-export main types
pub use compulsive::CompulsiveStrategy;
pub use function::FnStrategy;
pub use strategy::{TradeContext, TradingStrategy};
