//! Trader Core Domain
//!
//! Pure domain types for the compulsive trader.
//! This crate contains no async and no I/O.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Trader identity
    Company,
    CompanyCatalog,
    InvalidTraderConfig,
    TraderConfig,
    // Market data
    MarketTick,
    // Ledger view
    Portfolio,
    // Discovery
    ServiceKind,
    ServiceRecord,
    ServiceRequest,
};
pub use values::{Price, Quantity, Symbol, Timestamp};
