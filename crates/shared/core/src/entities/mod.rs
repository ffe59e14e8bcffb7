mod company;
mod portfolio;
mod service;
mod tick;
mod trader_config;

pub use company::{Company, CompanyCatalog};
pub use portfolio::Portfolio;
pub use service::{ServiceKind, ServiceRecord, ServiceRequest};
pub use tick::MarketTick;
pub use trader_config::{InvalidTraderConfig, TraderConfig};
