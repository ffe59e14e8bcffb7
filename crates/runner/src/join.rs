//! Readiness join
//!
//! Fans a fixed set of independent resolutions into one outcome: success
//! only when every input succeeds, otherwise the first failure observed.
//! All inputs are polled from the first poll, so their latencies overlap.
//! Inputs still pending when a failure wins are dropped, which cancels them;
//! their results can never surface.

use futures_util::StreamExt;
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::FuturesUnordered;
use std::future::Future;

/// Join two heterogeneous resolutions
pub async fn join_ready<A, B, E, FA, FB>(a: FA, b: FB) -> Result<(A, B), E>
where
    FA: Future<Output = Result<A, E>>,
    FB: Future<Output = Result<B, E>>,
{
    future::try_join(a, b).await
}

/// Join any number of homogeneous resolutions
///
/// Results come back in push order regardless of completion order.
pub struct ReadinessJoin<'a, T, E> {
    pending: FuturesUnordered<BoxFuture<'a, (usize, Result<T, E>)>>,
    len: usize,
}

impl<'a, T, E> ReadinessJoin<'a, T, E>
where
    T: Send + 'a,
    E: Send + 'a,
{
    pub fn new() -> Self {
        Self {
            pending: FuturesUnordered::new(),
            len: 0,
        }
    }

    /// Add a resolution. It starts on the first poll of [`ReadinessJoin::wait`].
    pub fn push<F>(&mut self, resolution: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        let index = self.len;
        self.pending
            .push(resolution.map(move |result| (index, result)).boxed());
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wait for every resolution, or the first failure
    pub async fn wait(mut self) -> Result<Vec<T>, E> {
        let mut slots: Vec<Option<T>> = (0..self.len).map(|_| None).collect();

        while let Some((index, result)) = self.pending.next().await {
            slots[index] = Some(result?);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

impl<'a, T, E> Default for ReadinessJoin<'a, T, E>
where
    T: Send + 'a,
    E: Send + 'a,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    async fn after<T>(ms: u64, value: Result<T, &'static str>) -> Result<T, &'static str> {
        sleep(Duration::from_millis(ms)).await;
        value
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_ready_overlaps_latencies() {
        let started = Instant::now();
        let (a, b) = join_ready(after(10, Ok(1)), after(50, Ok("two")))
            .await
            .unwrap();

        assert_eq!((a, b), (1, "two"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_ready_fails_fast() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let slow = async move {
            sleep(Duration::from_millis(500)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, &'static str>(())
        };

        let started = Instant::now();
        let err = join_ready(after::<u32>(10, Err("portfolio")), slow)
            .await
            .unwrap_err();

        assert_eq!(err, "portfolio");
        assert!(started.elapsed() < Duration::from_millis(50));

        // The straggler was dropped and never completes
        sleep(Duration::from_secs(1)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_join_preserves_push_order() {
        let mut join = ReadinessJoin::new();
        join.push(after(30, Ok("a")));
        join.push(after(10, Ok("b")));
        join.push(after(20, Ok("c")));
        assert_eq!(join.len(), 3);

        assert_eq!(join.wait().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_join_first_failure_wins() {
        let mut join = ReadinessJoin::new();
        join.push(after(10, Ok(1)));
        join.push(after(40, Err("late")));
        join.push(after(20, Err("early")));

        assert_eq!(join.wait().await.unwrap_err(), "early");
    }

    #[tokio::test]
    async fn test_empty_join_succeeds() {
        let join: ReadinessJoin<'_, u32, ()> = ReadinessJoin::default();
        assert!(join.is_empty());
        assert_eq!(join.wait().await, Ok(vec![]));
    }
}
