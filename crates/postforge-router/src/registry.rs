// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closed provider registry.
//!
//! Provider keys are parsed into [`ProviderKind`] before anything else, so an
//! unknown key fails synchronously and never reaches a vendor.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use postforge_anthropic::AnthropicProvider;
use postforge_config::PostforgeConfig;
use postforge_core::{PostforgeError, ProviderAdapter};
use postforge_openai::OpenAiProvider;
use postforge_resilience::{Sleeper, TokioSleeper};
use tracing::{info, warn};

/// The providers Postforge knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = PostforgeError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            _ => Err(PostforgeError::UnknownProvider {
                key: key.to_string(),
            }),
        }
    }
}

/// Maps provider kinds to live adapters.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds adapters for every provider that has credentials.
    ///
    /// A provider whose credentials are missing is left unregistered; any
    /// other construction failure is returned.
    pub fn from_config(config: &PostforgeConfig) -> Result<Self, PostforgeError> {
        Self::from_config_with_sleeper(config, Arc::new(TokioSleeper))
    }

    pub fn from_config_with_sleeper(
        config: &PostforgeConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, PostforgeError> {
        let mut registry = Self::new();

        match AnthropicProvider::with_sleeper(config, sleeper.clone()) {
            Ok(provider) => registry.register(ProviderKind::Anthropic, Arc::new(provider)),
            Err(PostforgeError::Config(reason)) => {
                warn!(provider = "anthropic", %reason, "provider not registered");
            }
            Err(e) => return Err(e),
        }

        match OpenAiProvider::with_sleeper(config, sleeper) {
            Ok(provider) => registry.register(ProviderKind::OpenAi, Arc::new(provider)),
            Err(PostforgeError::Config(reason)) => {
                warn!(provider = "openai", %reason, "provider not registered");
            }
            Err(e) => return Err(e),
        }

        info!(providers = ?registry.kinds(), "provider registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, kind: ProviderKind, provider: Arc<dyn ProviderAdapter>) {
        self.providers.insert(kind, provider);
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        use strum::IntoEnumIterator;
        ProviderKind::iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn ProviderAdapter>, PostforgeError> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            PostforgeError::Config(format!("provider `{kind}` is not configured"))
        })
    }

    /// Parses `key` and returns the matching adapter.
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn ProviderAdapter>, PostforgeError> {
        self.get(key.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_parse_case_insensitively() {
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, PostforgeError::UnknownProvider { ref key } if key == "gemini"));
        let err = "".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, PostforgeError::UnknownProvider { .. }));
    }

    #[test]
    fn resolving_unregistered_provider_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry.resolve("openai").err().unwrap();
        assert!(matches!(err, PostforgeError::Config(ref m) if m.contains("openai")));

        let err = registry.resolve("mistral").err().unwrap();
        assert!(matches!(err, PostforgeError::UnknownProvider { .. }));
    }

    #[test]
    fn config_keys_register_both_providers() {
        let mut config = PostforgeConfig::default();
        config.anthropic.api_key = Some("a".into());
        config.openai.api_key = Some("o".into());
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(
            registry.kinds(),
            vec![ProviderKind::Anthropic, ProviderKind::OpenAi]
        );
        assert_eq!(registry.resolve("anthropic").unwrap().name(), "anthropic");
    }
}
