//! Trader Gateway
//!
//! In-process implementations of the ports the trader consumes. Provides:
//! - Channel-based market-data source (tokio broadcast, one stream per subscriber)
//! - In-memory service registry implementing discovery and lookup
//! - Local portfolio ledger for simulations and tests
//!
//! ## Architecture
//!
//! ```text
//!  Feed / Simulator
//!         │ publish(tick)
//!    ┌────▼──────────────┐        ┌───────────────┐
//!    │ ChannelMarketSource│       │ LocalPortfolio │
//!    └────┬──────────────┘        └───────┬───────┘
//!         │ "market-data"                 │ "portfolio"
//!    ┌────▼───────────────────────────────▼───┐
//!    │              LocalRegistry             │
//!    └────────────────────┬───────────────────┘
//!                         │ lookup(name, kind)
//!                    ┌────▼────┐
//!                    │ Traders │
//!                    └─────────┘
//! ```
//!
//! ## Transport
//!
//! Uses tokio channels for single-process operation. Anything implementing the
//! port traits in `trader-ports` (a NATS-backed source, a gRPC ledger proxy, ...)
//! can be published in the registry instead.

pub mod adapters;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use adapters::{LedgerAction, LedgerOperation, LocalPortfolio, LocalRegistry, LookupPolicy};
pub use error::GatewayError;
pub use transport::{ServiceNames, channel::ChannelMarketSource};
