// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postforge poll` and `postforge watch` command implementations.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use postforge_anthropic::AnthropicProvider;
use postforge_batch::{BatchProcessor, PollReport, run_poll_loop};
use postforge_config::PostforgeConfig;
use postforge_core::{BatchVendor, PostforgeError};
use postforge_cost::CostTracker;
use postforge_router::ProviderKind;
use postforge_storage::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Vendor named by `batch.provider`.
fn batch_vendor(config: &PostforgeConfig) -> Result<Arc<dyn BatchVendor>, PostforgeError> {
    match ProviderKind::from_str(&config.batch.provider)? {
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicProvider::new(config)?)),
        other => Err(PostforgeError::Config(format!(
            "provider `{other}` does not support batch jobs"
        ))),
    }
}

/// Wires storage, cost tracking and the batch vendor into a processor.
async fn build_processor(
    config: &PostforgeConfig,
) -> Result<(Arc<BatchProcessor>, SqliteStore), PostforgeError> {
    let store = SqliteStore::open(&config.storage).await?;
    let cost = CostTracker::open(&config.cost, store.database()).await?;
    let vendor = batch_vendor(config)?;

    let processor = BatchProcessor::new(
        vendor,
        Arc::new(store.clone()),
        Arc::new(cost),
        &config.batch,
    );
    Ok((Arc::new(processor), store))
}

fn print_report(report: &PollReport) {
    if report.skipped {
        println!("poll pass skipped: another pass is running");
        return;
    }
    println!(
        "examined {}: {} completed, {} failed, {} processing, {} leased elsewhere, {} errors",
        report.examined,
        report.completed,
        report.failed,
        report.still_processing,
        report.leased_elsewhere,
        report.errors
    );
}

/// Runs a single poll pass.
pub async fn run_poll(config: &PostforgeConfig) -> Result<(), PostforgeError> {
    let (processor, store) = build_processor(config).await?;
    let report = processor.poll_batch_results().await?;
    print_report(&report);
    store.close().await
}

/// Polls on a fixed interval until Ctrl-C.
pub async fn run_watch(
    config: &PostforgeConfig,
    interval_secs: Option<u64>,
) -> Result<(), PostforgeError> {
    let (processor, store) = build_processor(config).await?;
    let interval = Duration::from_secs(interval_secs.unwrap_or(config.batch.poll_interval_secs));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, stopping poller"),
            Err(e) => warn!(error = %e, "failed to listen for interrupt, stopping poller"),
        }
        signal_cancel.cancel();
    });

    info!(owner = processor.owner(), "watching batch jobs");
    run_poll_loop(processor, interval, cancel).await;
    store.close().await
}
