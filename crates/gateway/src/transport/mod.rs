//! Transport layer
//!
//! Tokio channel-based market-data transport plus the logical service names
//! the trader looks up.

pub mod channel;
pub mod names;

pub use names::ServiceNames;
