//! Startup Integration Test
//!
//! Drives a trader against an in-process registry with injected latencies
//! and failures:
//! - Parallel resolution of the portfolio and market-data services
//! - Fail-fast on the first lookup failure
//! - Single-fire startup outcome
//! - Shutdown while startup is still in flight

use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use trader_core::{MarketTick, ServiceKind, ServiceRecord, TraderConfig};
use trader_gateway::{ChannelMarketSource, LocalPortfolio, LocalRegistry, LookupPolicy};
use trader_ports::{ServiceHandle, StrategyError, TraderError};
use trader_runner::{
    FnStrategy, StartupOutcome, TradeContext, TraderController, TraderSettings, TraderState,
    TradingStrategy,
};

struct Floor {
    registry: LocalRegistry,
    market: ChannelMarketSource,
}

fn floor_with(portfolio: bool, market: bool) -> Floor {
    let registry = LocalRegistry::new();
    let source = ChannelMarketSource::new("market-data", 16);

    if portfolio {
        registry
            .publish(
                ServiceRecord::new("portfolio", ServiceKind::RpcProxy),
                ServiceHandle::Portfolio(Arc::new(LocalPortfolio::new(dec!(1000)))),
            )
            .unwrap();
    }
    if market {
        registry
            .publish(
                ServiceRecord::new("market-data", ServiceKind::StreamSource),
                ServiceHandle::MarketSource(Arc::new(source.clone())),
            )
            .unwrap();
    }

    Floor {
        registry,
        market: source,
    }
}

fn floor() -> Floor {
    floor_with(true, true)
}

fn idle_strategy() -> Arc<dyn TradingStrategy> {
    Arc::new(FnStrategy::new(
        "idle",
        |_ctx: &TradeContext, _tick: &MarketTick| -> Result<(), StrategyError> { Ok(()) },
    ))
}

fn trader(registry: &LocalRegistry) -> TraderController {
    TraderController::new(
        TraderConfig::new("MacroHard", 3).unwrap(),
        Arc::new(registry.clone()),
        idle_strategy(),
        TraderSettings::default(),
    )
}

/// Startup succeeds exactly when both lookups succeed
#[tokio::test]
async fn test_success_iff_both_dependencies_resolve() {
    let _ = env_logger::try_init();

    for (portfolio, market) in [(true, true), (true, false), (false, true), (false, false)] {
        let floor = floor_with(portfolio, market);
        let mut controller = trader(&floor.registry);

        let outcome = controller.start().await;

        assert_eq!(
            outcome.is_success(),
            portfolio && market,
            "portfolio={} market={}",
            portfolio,
            market
        );
        if outcome.is_success() {
            assert_eq!(controller.state(), TraderState::Running);
            assert_eq!(floor.market.subscriber_count(), 1);
        } else {
            assert_eq!(controller.state(), TraderState::Failed);
            assert!(!controller.is_active());
            assert_eq!(floor.market.subscriber_count(), 0);
        }
        controller.shutdown().await;
    }
}

/// Lookups overlap: total wait is the slower lookup, not the sum
#[tokio::test(start_paused = true)]
async fn test_lookups_resolve_in_parallel() {
    let _ = env_logger::try_init();

    let floor = floor();
    floor
        .registry
        .set_policy("portfolio", LookupPolicy::delayed(Duration::from_millis(10)));
    floor
        .registry
        .set_policy("market-data", LookupPolicy::delayed(Duration::from_millis(50)));

    let mut controller = trader(&floor.registry);
    let started = Instant::now();
    let outcome = controller.start().await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, StartupOutcome::Success);
    assert!(elapsed >= Duration::from_millis(50), "took {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(60), "took {:?}", elapsed);
    assert_eq!(
        controller.transitions(),
        &[
            TraderState::Idle,
            TraderState::LocatingRegistry,
            TraderState::ResolvingDependencies,
            TraderState::Joining,
            TraderState::Subscribing,
            TraderState::Running,
        ]
    );

    controller.shutdown().await;
    assert_eq!(controller.state(), TraderState::Stopped);
}

/// A fast failure wins without waiting for the slow lookup
#[tokio::test(start_paused = true)]
async fn test_first_failure_fails_fast() {
    let _ = env_logger::try_init();

    let floor = floor();
    let not_found = TraderError::service_not_found("portfolio", ServiceKind::RpcProxy);
    floor.registry.set_policy(
        "portfolio",
        LookupPolicy::failing(Duration::from_millis(5), not_found.clone()),
    );
    floor
        .registry
        .set_policy("market-data", LookupPolicy::delayed(Duration::from_millis(100)));

    let mut controller = trader(&floor.registry);
    let started = Instant::now();
    let outcome = controller.start().await;

    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(outcome, StartupOutcome::Failure(not_found.clone()));
    assert_eq!(controller.state(), TraderState::Failed);
    assert!(!controller.transitions().contains(&TraderState::Subscribing));

    // The slow lookup would have succeeded by now; nothing changes
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(controller.outcome(), Some(&StartupOutcome::Failure(not_found)));
    assert_eq!(controller.state(), TraderState::Failed);
    assert_eq!(floor.market.subscriber_count(), 0);
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_registry_unavailable() {
    let _ = env_logger::try_init();

    let floor = floor();
    floor.registry.set_unavailable("registry offline");

    let mut controller = trader(&floor.registry);
    let outcome = controller.start().await;

    assert_eq!(
        outcome,
        StartupOutcome::Failure(TraderError::RegistryUnavailable("registry offline".into()))
    );
    assert_eq!(
        controller.transitions(),
        &[
            TraderState::Idle,
            TraderState::LocatingRegistry,
            TraderState::Failed
        ]
    );
}

/// A record of the wrong kind under the requested name counts as not found
#[tokio::test]
async fn test_wrong_kind_is_not_found() {
    let _ = env_logger::try_init();

    let floor = floor_with(false, true);
    floor
        .registry
        .publish(
            ServiceRecord::new("portfolio", ServiceKind::StreamSource),
            ServiceHandle::MarketSource(Arc::new(ChannelMarketSource::new("portfolio", 4))),
        )
        .unwrap();

    let mut controller = trader(&floor.registry);
    let outcome = controller.start().await;

    assert_eq!(
        outcome.error(),
        Some(&TraderError::service_not_found("portfolio", ServiceKind::RpcProxy))
    );
}

/// The outcome is reported once; starting again returns it without reporting
#[tokio::test]
async fn test_outcome_reported_once() {
    let _ = env_logger::try_init();

    let floor = floor();
    let mut controller = trader(&floor.registry);
    let mut reports = Vec::new();

    let first = controller
        .start_with(|outcome| reports.push(outcome.clone()))
        .await;
    let second = controller
        .start_with(|outcome| reports.push(outcome.clone()))
        .await;

    assert_eq!(first, StartupOutcome::Success);
    assert_eq!(second, first);
    assert_eq!(reports, vec![StartupOutcome::Success]);
    assert_eq!(floor.market.subscriber_count(), 1);

    controller.shutdown().await;
}

/// A failed trader can't be restarted into success
#[tokio::test]
async fn test_failure_is_final() {
    let _ = env_logger::try_init();

    let floor = floor();
    floor.registry.set_unavailable("down");
    let mut controller = trader(&floor.registry);
    let first = controller.start().await;

    floor.registry.set_available();
    let second = controller.start().await;

    assert!(!first.is_success());
    assert_eq!(second, first);
    assert_eq!(controller.state(), TraderState::Failed);
}

#[tokio::test]
async fn test_spawned_trader_lifecycle() {
    let _ = env_logger::try_init();

    let floor = floor();
    let (handle, signal) = trader(&floor.registry).with_id("trader-spawned").spawn();

    assert_eq!(signal.wait().await, StartupOutcome::Success);
    assert!(!handle.is_finished());

    let report = handle.shutdown().await.unwrap();
    assert_eq!(report.trader_id, "trader-spawned");
    assert_eq!(report.outcome, Some(StartupOutcome::Success));
    assert_eq!(report.final_state, TraderState::Stopped);
    assert_eq!(
        &report.transitions[report.transitions.len() - 2..],
        &[TraderState::Running, TraderState::Stopped]
    );
    assert_eq!(floor.market.subscriber_count(), 0);
}

#[tokio::test]
async fn test_spawned_trader_failure_finishes_on_its_own() {
    let _ = env_logger::try_init();

    let floor = floor_with(true, false);
    let (handle, signal) = trader(&floor.registry).spawn();

    let outcome = signal.wait().await;
    assert_eq!(
        outcome.error(),
        Some(&TraderError::service_not_found("market-data", ServiceKind::StreamSource))
    );

    let report = handle.join().await.unwrap();
    assert_eq!(report.final_state, TraderState::Failed);
}

/// Shutting down mid-startup settles the outcome as a shutdown failure
#[tokio::test(start_paused = true)]
async fn test_shutdown_during_startup() {
    let _ = env_logger::try_init();

    let floor = floor();
    floor
        .registry
        .set_policy("market-data", LookupPolicy::delayed(Duration::from_secs(10)));

    let (handle, signal) = trader(&floor.registry).spawn();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let report = handle.shutdown().await.unwrap();

    assert_eq!(signal.wait().await, StartupOutcome::Failure(TraderError::Shutdown));
    assert_eq!(report.outcome, Some(StartupOutcome::Failure(TraderError::Shutdown)));
    assert_eq!(report.final_state, TraderState::Failed);
    assert!(!report.transitions.contains(&TraderState::Running));
    assert_eq!(floor.market.subscriber_count(), 0);
}

/// Dropping the handle detaches the trader; it starts and keeps running
#[tokio::test]
async fn test_dropped_handle_detaches_trader() {
    let _ = env_logger::try_init();

    let floor = floor();
    let (_, signal) = trader(&floor.registry).spawn();

    assert_eq!(signal.wait().await, StartupOutcome::Success);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(floor.market.subscriber_count(), 1);
}

/// Settings are checked before the registry is contacted
#[tokio::test]
async fn test_invalid_settings_fail_startup() {
    let _ = env_logger::try_init();

    let floor = floor();
    let settings = TraderSettings {
        callback_timeout_ms: 0,
        ..Default::default()
    };
    let mut controller = TraderController::new(
        TraderConfig::new("MacroHard", 3).unwrap(),
        Arc::new(floor.registry.clone()),
        idle_strategy(),
        settings,
    );

    let outcome = controller.start().await;

    assert!(matches!(
        outcome,
        StartupOutcome::Failure(TraderError::InvalidConfig(ref reason))
            if reason.contains("callback_timeout_ms")
    ));
    assert_eq!(
        controller.transitions(),
        &[TraderState::Idle, TraderState::Failed]
    );
    assert_eq!(floor.market.subscriber_count(), 0);
}
