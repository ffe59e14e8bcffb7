use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use trader_core::{ServiceKind, ServiceRequest};

use crate::error::{TraderError, TraderResult};
use crate::market::MarketSource;
use crate::portfolio::PortfolioService;

/// Opaque capability returned by a lookup, tagged by kind
#[derive(Clone)]
pub enum ServiceHandle {
    Portfolio(Arc<dyn PortfolioService>),
    MarketSource(Arc<dyn MarketSource>),
}

impl ServiceHandle {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Self::Portfolio(_) => ServiceKind::RpcProxy,
            Self::MarketSource(_) => ServiceKind::StreamSource,
        }
    }

    /// Extract the portfolio proxy. A handle of the wrong kind counts as not found.
    pub fn into_portfolio(self, name: &str) -> TraderResult<Arc<dyn PortfolioService>> {
        match self {
            Self::Portfolio(p) => Ok(p),
            Self::MarketSource(_) => Err(TraderError::service_not_found(
                name,
                ServiceKind::RpcProxy,
            )),
        }
    }

    /// Extract the market source. A handle of the wrong kind counts as not found.
    pub fn into_market_source(self, name: &str) -> TraderResult<Arc<dyn MarketSource>> {
        match self {
            Self::MarketSource(m) => Ok(m),
            Self::Portfolio(_) => Err(TraderError::service_not_found(
                name,
                ServiceKind::StreamSource,
            )),
        }
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portfolio(_) => f.write_str("ServiceHandle::Portfolio"),
            Self::MarketSource(m) => write!(f, "ServiceHandle::MarketSource({})", m.name()),
        }
    }
}

/// Port for resolving a service by name and kind
///
/// A lookup completes exactly once, with a handle or an error.
/// Timeouts and retries are the locator's business.
#[async_trait]
pub trait ServiceLocator: Send + Sync {
    async fn lookup(&self, request: &ServiceRequest) -> TraderResult<ServiceHandle>;
}

/// Port for obtaining a locator (connecting to the registry)
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn connect(&self) -> TraderResult<Arc<dyn ServiceLocator>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure traits are object-safe
    fn _assert_locator_object_safe(_: &dyn ServiceLocator) {}
    fn _assert_discovery_object_safe(_: &dyn Discovery) {}
    fn _assert_portfolio_object_safe(_: &dyn PortfolioService) {}
    fn _assert_market_object_safe(_: &dyn MarketSource) {}
}
