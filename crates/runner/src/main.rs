use log::{info, warn};
use std::sync::Arc;
use trader_ports::PortfolioService;
use trader_runner::{CompulsiveStrategy, Settings, StartupOutcome, TradingFloor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_file(&path)?,
        None => Settings::default(),
    };
    let duration = settings.floor.duration();
    let traders = settings.floor.traders;

    let mut floor = TradingFloor::new(settings)?;

    let mut handles = Vec::with_capacity(traders);
    for _ in 0..traders {
        let (handle, signal) = floor.spawn_trader(Arc::new(CompulsiveStrategy::new()))?;
        handles.push((handle, signal));
    }

    let mut running = Vec::with_capacity(traders);
    for (handle, signal) in handles {
        match signal.wait().await {
            StartupOutcome::Success => running.push(handle),
            StartupOutcome::Failure(e) => {
                warn!("Trader failed to start: {}", e);
                handle.join().await;
            }
        }
    }
    info!("{} of {} traders running", running.len(), traders);

    floor.run_feed(duration).await;

    for handle in running {
        if let Some(report) = handle.shutdown().await {
            info!(
                "[{}] {} x{}: {} ticks, {} failed, final state {}",
                report.trader_id,
                report.config.company(),
                report.config.share_count(),
                report.stats.delivered,
                report.stats.failed,
                report.final_state
            );
        }
    }

    let ledger = floor.ledger();
    let positions = ledger.positions().await?;
    info!(
        "Ledger: {} operations, cash {}, shares {:?}, value {}",
        ledger.operations().len(),
        positions.cash,
        positions.shares,
        ledger.evaluate().await?
    );

    Ok(())
}
