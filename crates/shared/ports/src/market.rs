use async_trait::async_trait;
use futures_util::stream::BoxStream;
use trader_core::MarketTick;

use crate::error::TraderResult;

/// Live, unbounded, non-restartable sequence of ticks in source order
pub type TickStream = BoxStream<'static, MarketTick>;

/// Port for a streaming market-data source
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Open a new live stream. Ticks published before this call are not replayed.
    async fn subscribe(&self) -> TraderResult<TickStream>;

    /// Source name for logging
    fn name(&self) -> &str {
        "MarketSource"
    }
}
