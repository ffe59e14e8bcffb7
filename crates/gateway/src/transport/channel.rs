//! Tokio channel-based market-data source for single-process mode
//!
//! Uses a broadcast channel so every subscriber gets its own ordered stream.
//! No serialization overhead - ticks are passed directly.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use trader_core::MarketTick;
use trader_ports::{MarketSource, TickStream, TraderError, TraderResult};

/// Market-data source backed by a broadcast channel
///
/// Clones share the same channel. [`ChannelMarketSource::close`] drops the sender:
/// open streams end once drained and later subscriptions fail.
#[derive(Clone)]
pub struct ChannelMarketSource {
    name: Arc<str>,
    tx: Arc<Mutex<Option<broadcast::Sender<MarketTick>>>>,
}

impl ChannelMarketSource {
    /// Create a new source with the given channel capacity
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            name: Arc::from(name.into()),
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Publish a tick to every open stream.
    ///
    /// Returns the number of streams that will see it (0 with no subscribers
    /// or once closed).
    pub fn publish(&self, tick: MarketTick) -> usize {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(tick).unwrap_or(0),
            None => 0,
        }
    }

    /// Stop the source
    pub fn close(&self) {
        if self.tx.lock().take().is_some() {
            debug!("[{}] Market source closed", self.name);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Number of open streams
    pub fn subscriber_count(&self) -> usize {
        self.tx
            .lock()
            .as_ref()
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MarketSource for ChannelMarketSource {
    async fn subscribe(&self) -> TraderResult<TickStream> {
        let rx = self
            .tx
            .lock()
            .as_ref()
            .map(|tx| tx.subscribe())
            .ok_or_else(|| TraderError::Subscription(format!("{} is closed", self.name)))?;

        let name = self.name.clone();
        let ticks = stream::unfold(rx, move |mut rx| {
            let name = name.clone();
            async move {
                loop {
                    match rx.recv().await {
                        Ok(tick) => return Some((tick, rx)),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            // Skip lagged ticks and continue
                            warn!("[{}] Subscriber lagged {} ticks", name, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(ticks.boxed())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
