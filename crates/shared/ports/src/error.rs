use std::time::Duration;
use thiserror::Error;
use trader_core::ServiceKind;

/// Errors raised while starting or running a trader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraderError {
    #[error("Service registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("No service named '{name}' of kind {kind}")]
    ServiceNotFound { name: String, kind: ServiceKind },

    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Trader shut down before startup completed")]
    Shutdown,

    #[error("Invalid trader configuration: {0}")]
    InvalidConfig(String),
}

impl TraderError {
    pub fn service_not_found(name: impl Into<String>, kind: ServiceKind) -> Self {
        Self::ServiceNotFound {
            name: name.into(),
            kind,
        }
    }
}

pub type TraderResult<T> = std::result::Result<T, TraderError>;

/// Errors raised by a trading strategy while handling a tick.
///
/// These never stop the dispatch loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Ledger rejected the operation: {0}")]
    Rejected(#[from] PortfolioError),

    #[error("Callback exceeded {0:?}")]
    Timeout(Duration),

    #[error("Callback panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by the portfolio ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("Cannot trade {0} shares")]
    InvalidAmount(u32),

    #[error("Not enough cash to buy {amount} shares of {company}")]
    InsufficientCash { company: String, amount: u32 },

    #[error("Not enough shares of {company} to sell {amount}")]
    InsufficientShares { company: String, amount: u32 },

    #[error("Quote for {0} carries no usable price")]
    NoPrice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TraderError::service_not_found("portfolio", ServiceKind::RpcProxy);
        assert_eq!(
            err.to_string(),
            "No service named 'portfolio' of kind rpc-proxy"
        );

        let err: StrategyError = PortfolioError::InvalidAmount(0).into();
        assert_eq!(
            err.to_string(),
            "Ledger rejected the operation: Cannot trade 0 shares"
        );
    }
}
