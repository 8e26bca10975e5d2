// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./postforge.toml` > `~/.config/postforge/postforge.toml`
//! > `/etc/postforge/postforge.toml`, with `POSTFORGE_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PostforgeConfig;

/// Config sections that env vars may address, e.g. `POSTFORGE_BATCH_LEASE_SECS`.
const SECTIONS: &[&str] = &[
    "service", "anthropic", "openai", "storage", "cost", "retry", "batch", "cache",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/postforge/postforge.toml`
/// 3. `~/.config/postforge/postforge.toml`
/// 4. `./postforge.toml`
/// 5. `POSTFORGE_*` environment variables
pub fn load_config() -> Result<PostforgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PostforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostforgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PostforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostforgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PostforgeConfig::default()))
        .merge(Toml::file("/etc/postforge/postforge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("postforge/postforge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("postforge.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `POSTFORGE_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `POSTFORGE_BATCH_POLL_INTERVAL_SECS` maps to `batch.poll_interval_secs`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("POSTFORGE_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
