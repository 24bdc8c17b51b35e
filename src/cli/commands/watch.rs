//! Foreground monitor: refreshes on an interval and reports new changes.

use anyhow::Result;
use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::cli::open_engine;
use crate::domain::models::{Config, MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS};
use crate::services::{MonitorEvent, StatusChange};

/// Arguments for `repolens watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between refresh cycles (overrides the configured value)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u64).range(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS)
    )]
    pub interval: Option<u64>,

    /// Do not raise notifications for new changes
    #[arg(long)]
    pub no_notify: bool,
}

/// Run the monitor until Ctrl+C.
pub async fn execute(args: WatchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut config = config.clone();
    if let Some(secs) = args.interval {
        config.monitor.refresh_interval_secs = secs;
    }
    if args.no_notify {
        config.monitor.notifications_enabled = false;
    }

    let engine = open_engine(&config).await;
    let mut events = engine.subscribe();
    engine.start().await;

    if !json_mode {
        println!(
            "Watching {} repositor(ies) every {}s. Press Ctrl+C to stop.",
            engine.collection().len().await,
            config.monitor.refresh_interval_secs
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(MonitorEvent::CycleCompleted { changes, duration_ms }) => {
                    report(&changes, duration_ms, json_mode);
                }
                Ok(MonitorEvent::Started) => {}
                Ok(MonitorEvent::Stopped) | Err(RecvError::Closed) => return Ok(()),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "monitor events dropped"),
            },
        }
    }

    engine.stop().await;
    // Let an in-flight cycle finish and persist before exiting.
    while let Ok(event) = events.recv().await {
        match event {
            MonitorEvent::Stopped => break,
            MonitorEvent::CycleCompleted { changes, duration_ms } => {
                report(&changes, duration_ms, json_mode);
            }
            MonitorEvent::Started => {}
        }
    }
    Ok(())
}

fn report(changes: &[StatusChange], duration_ms: u64, json_mode: bool) {
    if json_mode {
        let line = serde_json::json!({ "changes": changes, "duration_ms": duration_ms });
        println!("{line}");
        return;
    }
    for change in changes {
        println!("{}: {}", change.title(), change.body());
    }
}
