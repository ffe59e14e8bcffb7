//! Stream Subscription - runs the per-tick dispatch loop
//!
//! Turns a market source into a live subscription:
//! - One dispatch task per subscription, pulling ticks in source order
//! - The handler is awaited tick by tick, never two at once
//! - Each invocation is bounded by a timeout and isolated from panics
//! - Handler errors are logged and counted; the loop carries on
//!
//! The loop is armed but idle until [`SubscriptionHandle::activate`] is
//! called. Ticks arriving meanwhile wait in the stream.

use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt};
use log::{debug, info, warn};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trader_core::MarketTick;
use trader_ports::{MarketSource, StrategyError, TickStream, TraderResult};
use trader_strategy::{TradeContext, TradingStrategy};

/// Receives every tick of a subscription
#[async_trait]
pub trait TickHandler: Send + Sync + 'static {
    async fn handle(&self, tick: &MarketTick) -> Result<(), StrategyError>;
}

/// A strategy bound to its trade context
///
/// This is the trading callback: company, share count and ledger handle are
/// fixed here once, at subscription time.
pub struct StrategyHandler {
    strategy: Arc<dyn TradingStrategy>,
    ctx: TradeContext,
}

impl StrategyHandler {
    pub fn new(strategy: Arc<dyn TradingStrategy>, ctx: TradeContext) -> Self {
        Self { strategy, ctx }
    }

    pub fn context(&self) -> &TradeContext {
        &self.ctx
    }
}

#[async_trait]
impl TickHandler for StrategyHandler {
    async fn handle(&self, tick: &MarketTick) -> Result<(), StrategyError> {
        self.strategy.on_tick(&self.ctx, tick).await
    }
}

/// Dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Ticks handed to the handler
    pub delivered: u64,
    /// Invocations that returned an error, timed out or panicked
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Subscription options
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Prefix for log lines
    pub label: String,
    /// Upper bound on one handler invocation
    pub callback_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            label: "subscription".to_string(),
            callback_timeout: Duration::from_secs(1),
        }
    }
}

/// Adapts a market source into a dispatch loop
pub struct StreamSubscription;

impl StreamSubscription {
    /// Open a stream on `source` and arm a dispatch loop for `handler`
    pub async fn subscribe<H: TickHandler>(
        source: &dyn MarketSource,
        handler: H,
        settings: DispatchSettings,
    ) -> TraderResult<SubscriptionHandle> {
        let ticks = source.subscribe().await?;
        debug!("[{}] Subscribed to {}", settings.label, source.name());
        Ok(Self::from_stream(ticks, handler, settings))
    }

    /// Arm a dispatch loop over an already-open stream
    pub fn from_stream<H: TickHandler>(
        ticks: TickStream,
        handler: H,
        settings: DispatchSettings,
    ) -> SubscriptionHandle {
        let token = CancellationToken::new();
        let counters = Arc::new(Counters::default());
        let (go_tx, go_rx) = oneshot::channel();

        let task = tokio::spawn(dispatch_loop(
            ticks,
            handler,
            settings,
            go_rx,
            token.clone(),
            counters.clone(),
        ));

        SubscriptionHandle {
            token,
            go: Some(go_tx),
            task: Some(task),
            counters,
        }
    }
}

async fn dispatch_loop<H: TickHandler>(
    mut ticks: TickStream,
    handler: H,
    settings: DispatchSettings,
    go: oneshot::Receiver<()>,
    token: CancellationToken,
    counters: Arc<Counters>,
) {
    let label = settings.label;

    tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = go => {
            if result.is_err() {
                // Handle dropped before activation
                return;
            }
        }
    }

    info!("[{}] Dispatch loop started", label);

    loop {
        // Cancellation is checked before every tick
        let tick = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("[{}] Dispatch loop cancelled", label);
                break;
            }
            next = ticks.next() => match next {
                Some(tick) => tick,
                None => {
                    info!("[{}] Market stream ended", label);
                    break;
                }
            },
        };

        counters.delivered.fetch_add(1, Ordering::Relaxed);

        let invocation = tokio::time::timeout(settings.callback_timeout, handler.handle(&tick));
        let result = match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(StrategyError::Timeout(settings.callback_timeout)),
            Err(panic) => Err(StrategyError::Panicked(panic_message(panic.as_ref()))),
        };

        if let Err(e) = result {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!("[{}] Strategy failed on {} tick: {}", label, tick.symbol, e);
        }
    }

    info!("[{}] Dispatch loop stopped", label);
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Live registration of a handler on a market stream
///
/// Dropping the handle cancels the subscription.
pub struct SubscriptionHandle {
    token: CancellationToken,
    go: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl SubscriptionHandle {
    /// Start delivering ticks. Later calls do nothing.
    pub fn activate(&mut self) {
        if let Some(go) = self.go.take() {
            let _ = go.send(());
        }
    }

    /// Stop dispatching and wait for the loop to exit.
    ///
    /// An invocation already in progress is allowed to finish; once this
    /// returns the handler is never called again.
    pub async fn cancel(&mut self) {
        self.token.cancel();
        self.go = None;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Wait until the stream ends on its own (or the loop is cancelled)
    pub async fn closed(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }

    /// Whether the dispatch loop can still invoke the handler
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
