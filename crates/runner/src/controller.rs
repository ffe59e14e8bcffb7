//! Trader Controller - drives one trader from discovery to steady state
//!
//! ```text
//! Idle ─► LocatingRegistry ─► ResolvingDependencies ─► Joining ─► Subscribing ─► Running ─► Stopped
//!              │                       │                  │            │
//!              └───────────────────────┴──────────────────┴────────────┴──────► Failed
//! ```
//!
//! The startup outcome is reported exactly once. On success the trading
//! callback is installed, the outcome is reported, and only then does the
//! dispatch loop start pulling ticks. On failure nothing is left running and
//! any resolved handles are dropped. There are no retries at this layer.

use log::{error, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use trader_core::{ServiceRequest, TraderConfig};
use trader_ports::{Discovery, PortfolioService, TraderError, TraderResult};
use trader_strategy::{TradeContext, TradingStrategy};
use uuid::Uuid;

use crate::join::join_ready;
use crate::settings::TraderSettings;
use crate::subscription::{
    DispatchSettings, DispatchStats, StrategyHandler, StreamSubscription, SubscriptionHandle,
};

/// Lifecycle state of a trader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraderState {
    Idle,
    LocatingRegistry,
    ResolvingDependencies,
    Joining,
    Subscribing,
    Running,
    /// Shut down after running
    Stopped,
    Failed,
}

impl TraderState {
    /// Whether startup reporting is closed in this state
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Running | Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for TraderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of a trader's startup, reported once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    Success,
    Failure(TraderError),
}

impl StartupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error(&self) -> Option<&TraderError> {
        match self {
            Self::Success => None,
            Self::Failure(e) => Some(e),
        }
    }
}

/// Summary of a finished trader
#[derive(Debug, Clone)]
pub struct TraderReport {
    pub trader_id: String,
    pub config: TraderConfig,
    pub outcome: Option<StartupOutcome>,
    pub final_state: TraderState,
    pub transitions: Vec<TraderState>,
    pub stats: DispatchStats,
}

/// Orchestrates one trader's lifecycle
pub struct TraderController {
    trader_id: String,
    config: TraderConfig,
    settings: TraderSettings,
    discovery: Arc<dyn Discovery>,
    strategy: Arc<dyn TradingStrategy>,
    state: TraderState,
    transitions: Vec<TraderState>,
    outcome: Option<StartupOutcome>,
    portfolio: Option<Arc<dyn PortfolioService>>,
    subscription: Option<SubscriptionHandle>,
    last_stats: DispatchStats,
}

impl TraderController {
    pub fn new(
        config: TraderConfig,
        discovery: Arc<dyn Discovery>,
        strategy: Arc<dyn TradingStrategy>,
        settings: TraderSettings,
    ) -> Self {
        let trader_id = format!("trader-{}", &Uuid::new_v4().simple().to_string()[..8]);
        Self {
            trader_id,
            config,
            settings,
            discovery,
            strategy,
            state: TraderState::Idle,
            transitions: vec![TraderState::Idle],
            outcome: None,
            portfolio: None,
            subscription: None,
            last_stats: DispatchStats::default(),
        }
    }

    /// Override the generated identifier
    pub fn with_id(mut self, trader_id: impl Into<String>) -> Self {
        self.trader_id = trader_id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.trader_id
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn state(&self) -> TraderState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn transitions(&self) -> &[TraderState] {
        &self.transitions
    }

    pub fn outcome(&self) -> Option<&StartupOutcome> {
        self.outcome.as_ref()
    }

    /// Whether the trading callback can currently be invoked
    pub fn is_active(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn stats(&self) -> DispatchStats {
        self.subscription
            .as_ref()
            .map(|s| s.stats())
            .unwrap_or(self.last_stats)
    }

    /// Run startup and return the outcome
    pub async fn start(&mut self) -> StartupOutcome {
        self.start_with(|_| {}).await
    }

    /// Run startup, reporting the outcome to `on_complete` exactly once.
    ///
    /// On success `on_complete` runs before the first tick is dispatched.
    /// Calling this again after startup has settled returns the first
    /// outcome and does not call `on_complete`.
    pub async fn start_with<F>(&mut self, on_complete: F) -> StartupOutcome
    where
        F: FnOnce(&StartupOutcome),
    {
        if let Some(outcome) = &self.outcome {
            warn!("[{}] Startup already settled, ignoring start", self.trader_id);
            return outcome.clone();
        }

        info!(
            "[{}] Starting: company {}, {} shares",
            self.trader_id,
            self.config.company(),
            self.config.share_count()
        );

        let outcome = match self.startup().await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.transition(TraderState::Running);
                StartupOutcome::Success
            }
            Err(e) => {
                error!("[{}] Startup failed: {}", self.trader_id, e);
                self.portfolio = None;
                self.transition(TraderState::Failed);
                StartupOutcome::Failure(e)
            }
        };

        self.outcome = Some(outcome.clone());
        on_complete(&outcome);

        if let Some(subscription) = self.subscription.as_mut() {
            subscription.activate();
            info!("[{}] Running", self.trader_id);
        }

        outcome
    }

    async fn startup(&mut self) -> TraderResult<SubscriptionHandle> {
        self.settings
            .validate()
            .map_err(|e| TraderError::InvalidConfig(e.to_string()))?;

        self.transition(TraderState::LocatingRegistry);
        let locator = self.discovery.connect().await.map_err(|e| match e {
            TraderError::RegistryUnavailable(_) => e,
            other => TraderError::RegistryUnavailable(other.to_string()),
        })?;

        self.transition(TraderState::ResolvingDependencies);
        let portfolio_request = ServiceRequest::rpc_proxy(self.settings.portfolio_service.clone());
        let market_request = ServiceRequest::stream_source(self.settings.market_data_service.clone());
        let portfolio_lookup = locator.lookup(&portfolio_request);
        let market_lookup = locator.lookup(&market_request);

        self.transition(TraderState::Joining);
        let (portfolio, market) = join_ready(portfolio_lookup, market_lookup).await?;
        let portfolio = portfolio.into_portfolio(&portfolio_request.name)?;
        let market = market.into_market_source(&market_request.name)?;
        info!(
            "[{}] Resolved {} and {}",
            self.trader_id, portfolio_request, market_request
        );

        self.transition(TraderState::Subscribing);
        let handler = StrategyHandler::new(
            self.strategy.clone(),
            TradeContext::new(&self.config, portfolio.clone()),
        );
        let dispatch = DispatchSettings {
            label: self.trader_id.clone(),
            callback_timeout: self.settings.callback_timeout(),
        };
        let subscription = StreamSubscription::subscribe(market.as_ref(), handler, dispatch).await?;

        self.portfolio = Some(portfolio);
        Ok(subscription)
    }

    /// Settle a startup that was abandoned midway (its future was dropped)
    fn abandon(&mut self) {
        if self.outcome.is_none() {
            warn!("[{}] Startup abandoned in {}", self.trader_id, self.state);
            self.subscription = None;
            self.portfolio = None;
            self.transition(TraderState::Failed);
            self.outcome = Some(StartupOutcome::Failure(TraderError::Shutdown));
        }
    }

    /// Wait until the market stream ends on its own
    pub async fn closed(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.closed().await;
        }
    }

    /// Cancel the subscription and release every handle. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel().await;
            self.last_stats = subscription.stats();
            info!(
                "[{}] Stopped after {} ticks ({} failed)",
                self.trader_id, self.last_stats.delivered, self.last_stats.failed
            );
        }
        self.portfolio = None;
        if self.state == TraderState::Running {
            self.transition(TraderState::Stopped);
        }
    }

    fn transition(&mut self, next: TraderState) {
        log::debug!("[{}] {} -> {}", self.trader_id, self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    fn report(&self) -> TraderReport {
        TraderReport {
            trader_id: self.trader_id.clone(),
            config: self.config.clone(),
            outcome: self.outcome.clone(),
            final_state: self.state,
            transitions: self.transitions.clone(),
            stats: self.stats(),
        }
    }

    /// Run the trader on its own task.
    ///
    /// Returns a handle for shutting it down and a signal that resolves once
    /// with the startup outcome.
    pub fn spawn(self) -> (TraderHandle, StartupSignal) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut controller = self;

            // A dropped handle detaches the trader instead of stopping it
            let shutdown = async move {
                if shutdown_rx.await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            tokio::pin!(shutdown);

            let settled = tokio::select! {
                biased;
                _ = &mut shutdown => false,
                _ = controller.start_with(move |outcome| {
                    let _ = outcome_tx.send(outcome.clone());
                }) => true,
            };

            if !settled {
                controller.abandon();
            } else if controller.state() == TraderState::Running {
                tokio::select! {
                    _ = &mut shutdown => {}
                    _ = controller.closed() => {}
                }
            }

            controller.shutdown().await;
            controller.report()
        });

        (
            TraderHandle {
                shutdown: Some(shutdown_tx),
                task,
            },
            StartupSignal { rx: outcome_rx },
        )
    }
}

/// Single-fire startup completion signal
pub struct StartupSignal {
    rx: oneshot::Receiver<StartupOutcome>,
}

impl StartupSignal {
    /// Wait for the outcome. A trader dropped before settling reports
    /// [`TraderError::Shutdown`].
    pub async fn wait(self) -> StartupOutcome {
        self.rx
            .await
            .unwrap_or(StartupOutcome::Failure(TraderError::Shutdown))
    }
}

/// Handle to a spawned trader
///
/// Dropping the handle detaches the trader, like dropping a tokio
/// `JoinHandle`: it keeps running until its market stream ends.
pub struct TraderHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<TraderReport>,
}

impl TraderHandle {
    /// Stop the trader (cancelling a startup still in progress) and collect its report
    pub async fn shutdown(mut self) -> Option<TraderReport> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.join().await
    }

    /// Wait for the trader to finish on its own (failed startup or ended stream)
    pub async fn join(self) -> Option<TraderReport> {
        match self.task.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Trader task failed: {}", e);
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
