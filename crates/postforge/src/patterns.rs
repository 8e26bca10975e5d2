// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postforge patterns` command implementation.

use std::sync::Arc;

use postforge_config::PostforgeConfig;
use postforge_core::PostforgeError;
use postforge_patterns::PatternRotation;
use postforge_storage::SqliteStore;

/// Prints the constraint block the next generation for `account_id` would get.
pub async fn run_patterns(config: &PostforgeConfig, account_id: &str) -> Result<(), PostforgeError> {
    let store = SqliteStore::open(&config.storage).await?;
    let rotation = PatternRotation::new(Arc::new(store));

    let block = rotation.get_pattern_constraint_block(account_id).await;
    if let Some(reason) = block.reason() {
        eprintln!("warning: history unavailable ({reason}); no constraints applied");
    }
    let block = block.into_value();
    if block.is_empty() {
        println!("no pattern constraints for `{account_id}`");
    } else {
        println!("{block}");
    }
    Ok(())
}
