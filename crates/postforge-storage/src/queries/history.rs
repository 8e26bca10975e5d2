// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation history: append-only pattern usage rows per account.

use postforge_core::{GenerationHistoryEntry, PatternCode, PatternUsage, PostforgeError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Appends one usage row for `account_id`.
pub async fn append_usage(
    db: &Database,
    account_id: &str,
    usage: &PatternUsage,
) -> Result<(), PostforgeError> {
    let account_id = account_id.to_string();
    let opening = usage.opening.as_ref().map(|c| c.0.clone());
    let development = usage.development.as_ref().map(|c| c.0.clone());
    let closing = usage.closing.as_ref().map(|c| c.0.clone());
    let expressions = serde_json::to_string(&usage.expressions).map_err(PostforgeError::storage)?;

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO generation_history
                    (account_id, opening_pattern, development_pattern, closing_pattern, expressions)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![account_id, opening, development, closing, expressions],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent entries for `account_id`, newest first.
pub async fn recent_history(
    db: &Database,
    account_id: &str,
    limit: usize,
) -> Result<Vec<GenerationHistoryEntry>, PostforgeError> {
    let account_id = account_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    type Row = (Option<String>, Option<String>, Option<String>, String);
    let rows: Vec<Row> = db
        .connection()
        .call(move |conn| -> Result<Vec<Row>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT opening_pattern, development_pattern, closing_pattern, expressions
                 FROM generation_history
                 WHERE account_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![account_id, limit], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(opening, development, closing, expressions)| {
            Ok(GenerationHistoryEntry {
                opening: opening.map(PatternCode),
                development: development.map(PatternCode),
                closing: closing.map(PatternCode),
                expressions: serde_json::from_str(&expressions)
                    .map_err(PostforgeError::storage)?,
            })
        })
        .collect()
}
