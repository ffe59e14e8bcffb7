//! In-process adapters
//!
//! Stand-ins for the remote collaborators: a service registry the trader
//! discovers its dependencies through, and a portfolio ledger.

mod ledger;
mod registry;

pub use ledger::{LedgerAction, LedgerOperation, LocalPortfolio};
pub use registry::{LocalRegistry, LookupPolicy};
