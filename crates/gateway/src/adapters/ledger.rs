//! Local portfolio ledger
//!
//! A single-account ledger with the usual rules: buys are priced at the
//! quote's ask and need enough cash, sells are priced at the bid and need
//! enough shares. Quotes without bid/ask fall back to the last price.

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use trader_core::{MarketTick, Portfolio, Price, Quantity, Timestamp};
use trader_ports::{PortfolioError, PortfolioService};

/// Side of a ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    Buy,
    Sell,
}

/// One executed operation, kept for auditing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOperation {
    pub action: LedgerAction,
    pub company: String,
    pub amount: Quantity,
    pub price: Price,
    pub timestamp: Timestamp,
}

struct LedgerState {
    portfolio: Portfolio,
    last_prices: BTreeMap<String, Price>,
    operations: VecDeque<LedgerOperation>,
    log_capacity: usize,
}

/// In-process portfolio ledger
///
/// Clones share the same account, so one ledger can be published once and
/// used by every trader.
#[derive(Clone)]
pub struct LocalPortfolio {
    state: Arc<Mutex<LedgerState>>,
}

impl LocalPortfolio {
    /// Operations kept in the audit log by default
    pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

    pub fn new(initial_cash: Decimal) -> Self {
        Self::with_log_capacity(initial_cash, Self::DEFAULT_LOG_CAPACITY)
    }

    /// Keep at most `capacity` operations in the audit log; older ones are dropped
    pub fn with_log_capacity(initial_cash: Decimal, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                portfolio: Portfolio::with_cash(initial_cash),
                last_prices: BTreeMap::new(),
                operations: VecDeque::new(),
                log_capacity: capacity.max(1),
            })),
        }
    }

    /// Most recent executed operations, oldest first
    pub fn operations(&self) -> Vec<LedgerOperation> {
        self.state.lock().operations.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> Portfolio {
        self.state.lock().portfolio.clone()
    }

    fn unit_price(quote: &MarketTick, action: LedgerAction) -> Result<Price, PortfolioError> {
        let price = match action {
            LedgerAction::Buy => quote.ask(),
            LedgerAction::Sell => quote.bid(),
        }
        .unwrap_or(quote.price);

        if price <= Decimal::ZERO {
            return Err(PortfolioError::NoPrice(quote.name.clone()));
        }
        Ok(price)
    }

    fn record(
        state: &mut LedgerState,
        action: LedgerAction,
        quote: &MarketTick,
        amount: Quantity,
        price: Price,
    ) {
        state.last_prices.insert(quote.name.clone(), quote.price);
        if state.operations.len() == state.log_capacity {
            state.operations.pop_front();
        }
        state.operations.push_back(LedgerOperation {
            action,
            company: quote.name.clone(),
            amount,
            price,
            timestamp: Utc::now(),
        });
        info!(
            "Ledger {:?} {} x {} @ {} (cash now {})",
            action, amount, quote.name, price, state.portfolio.cash
        );
    }
}

#[async_trait]
impl PortfolioService for LocalPortfolio {
    async fn buy(&self, amount: Quantity, quote: &MarketTick) -> Result<Portfolio, PortfolioError> {
        if amount == 0 {
            return Err(PortfolioError::InvalidAmount(amount));
        }
        let price = Self::unit_price(quote, LedgerAction::Buy)?;
        let cost = price * Decimal::from(amount);

        let mut state = self.state.lock();
        if state.portfolio.cash < cost {
            return Err(PortfolioError::InsufficientCash {
                company: quote.name.clone(),
                amount,
            });
        }

        state.portfolio.cash -= cost;
        *state.portfolio.shares.entry(quote.name.clone()).or_insert(0) += amount;
        Self::record(&mut state, LedgerAction::Buy, quote, amount, price);
        Ok(state.portfolio.clone())
    }

    async fn sell(
        &self,
        amount: Quantity,
        quote: &MarketTick,
    ) -> Result<Portfolio, PortfolioError> {
        if amount == 0 {
            return Err(PortfolioError::InvalidAmount(amount));
        }
        let price = Self::unit_price(quote, LedgerAction::Sell)?;

        let mut state = self.state.lock();
        let held = state.portfolio.shares_of(&quote.name);
        if held < amount {
            return Err(PortfolioError::InsufficientShares {
                company: quote.name.clone(),
                amount,
            });
        }

        if held == amount {
            state.portfolio.shares.remove(&quote.name);
        } else {
            state.portfolio.shares.insert(quote.name.clone(), held - amount);
        }
        state.portfolio.cash += price * Decimal::from(amount);
        Self::record(&mut state, LedgerAction::Sell, quote, amount, price);
        Ok(state.portfolio.clone())
    }

    async fn positions(&self) -> Result<Portfolio, PortfolioError> {
        Ok(self.snapshot())
    }

    async fn evaluate(&self) -> Result<Decimal, PortfolioError> {
        let state = self.state.lock();
        Ok(state.portfolio.value(&state.last_prices))
    }
}
