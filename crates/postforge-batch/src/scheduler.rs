// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring poll passes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::processor::BatchProcessor;

/// Shortest period between poll passes.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runs `poll_batch_results` every `interval` until `cancel` fires.
///
/// The first pass runs immediately. Intervals below [`MIN_POLL_INTERVAL`] are
/// raised to it. Ticks missed while a pass is running are delayed rather than
/// bunched, and pass errors are logged.
pub async fn run_poll_loop(
    processor: Arc<BatchProcessor>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let interval = interval.max(MIN_POLL_INTERVAL);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = interval.as_secs(), "batch poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match processor.poll_batch_results().await {
                    Ok(report) if report.skipped => debug!("poll pass skipped"),
                    Ok(report) => debug!(
                        examined = report.examined,
                        completed = report.completed,
                        failed = report.failed,
                        errors = report.errors,
                        "poll pass done"
                    ),
                    Err(e) => warn!(error = %e, "poll pass failed (non-fatal)"),
                }
            }
            _ = cancel.cancelled() => {
                info!("batch poller shutting down");
                break;
            }
        }
    }
}
