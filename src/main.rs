// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Mirror sync runner
//!
//! Runs one full update pass against Strava: connect, sync new activities,
//! refresh them to full detail, sync starred segments, then save the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strava_mirror::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        store = %config.store_path.display(),
        api = %config.api_base_url,
        "Starting Strava-Mirror"
    );

    let state = AppState::from_config(config)?;

    // Ctrl-C stops before the next per-activity fetch; in-flight requests finish.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after in-flight requests");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut sync = state.sync_service();
    let update = sync
        .run_update(&stop, |status| tracing::info!(status = %status, "Sync status"))
        .await;

    match update {
        Ok(summary) => {
            tracing::info!(
                athlete_id = summary.athlete_id,
                new = summary.activities.new_activities,
                refreshed = summary.details.completed,
                failed = summary.details.failed,
                "Activities up to date"
            );
        }
        Err(e) => tracing::error!(error = %e, "Unable to get update"),
    }

    if !stop.load(Ordering::Relaxed) {
        match sync.sync_starred_segments(|_| {}).await {
            Ok(segments) => tracing::info!(count = segments.len(), "Starred segments synced"),
            Err(e) => tracing::error!(error = %e, "Unable to sync starred segments"),
        }
        sync.wait_for_follow_ups().await;
    }

    state.save().await?;
    tracing::info!("Store saved");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strava_mirror=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
