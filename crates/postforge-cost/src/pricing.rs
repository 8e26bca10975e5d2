// SPDX-FileCopyrightText: 2026 Postforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Prices are USD per million tokens, taken from the vendors' public price
//! lists. Batch requests are billed at half the synchronous rate by both
//! vendors.

use postforge_core::TokenUsage;

/// Multiplier applied to batch usage.
pub const BATCH_DISCOUNT: f64 = 0.5;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl ModelPricing {
    const fn new(input_per_mtok: f64, output_per_mtok: f64) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }
}

/// Looks up pricing for a provider/model pair.
///
/// Matches on model-name substrings. Unknown models fall back to the
/// provider's mid-tier price so usage is never recorded as free.
pub fn get_pricing(provider: &str, model: &str) -> ModelPricing {
    let model = model.to_lowercase();
    match provider {
        "openai" => openai_pricing(&model),
        _ => anthropic_pricing(&model),
    }
}

fn anthropic_pricing(model: &str) -> ModelPricing {
    if model.contains("opus") {
        ModelPricing::new(15.0, 75.0)
    } else if model.contains("haiku") {
        ModelPricing::new(0.80, 4.0)
    } else {
        ModelPricing::new(3.0, 15.0)
    }
}

fn openai_pricing(model: &str) -> ModelPricing {
    if model.starts_with("gpt-4o-mini") {
        ModelPricing::new(0.15, 0.60)
    } else if model.starts_with("gpt-4o") {
        ModelPricing::new(2.50, 10.0)
    } else if model.starts_with("o1") {
        ModelPricing::new(15.0, 60.0)
    } else if model.starts_with("o3-mini") || model.starts_with("o4-mini") {
        ModelPricing::new(1.10, 4.40)
    } else if model.starts_with("o3") {
        ModelPricing::new(2.0, 8.0)
    } else if model.starts_with("gpt-5") {
        ModelPricing::new(1.25, 10.0)
    } else {
        ModelPricing::new(2.50, 10.0)
    }
}

/// Cost in USD of `usage` at `pricing`, halved for batch requests.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing, is_batch: bool) -> f64 {
    let input = (f64::from(usage.input_tokens) / 1_000_000.0) * pricing.input_per_mtok;
    let output = (f64::from(usage.output_tokens) / 1_000_000.0) * pricing.output_per_mtok;
    let cost = input + output;
    if is_batch { cost * BATCH_DISCOUNT } else { cost }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn anthropic_tiers() {
        assert_eq!(
            get_pricing("anthropic", "claude-opus-4-20250514"),
            ModelPricing::new(15.0, 75.0)
        );
        assert_eq!(
            get_pricing("anthropic", "claude-3-5-haiku-latest"),
            ModelPricing::new(0.80, 4.0)
        );
        assert_eq!(
            get_pricing("anthropic", "claude-sonnet-4-20250514"),
            ModelPricing::new(3.0, 15.0)
        );
    }

    #[test]
    fn openai_mini_is_not_priced_as_full_model() {
        assert_eq!(
            get_pricing("openai", "gpt-4o-mini"),
            ModelPricing::new(0.15, 0.60)
        );
        assert_eq!(get_pricing("openai", "gpt-4o"), ModelPricing::new(2.50, 10.0));
        assert_eq!(get_pricing("openai", "o3-mini"), ModelPricing::new(1.10, 4.40));
    }

    #[test]
    fn unknown_models_are_never_free() {
        assert!(get_pricing("openai", "mystery").input_per_mtok > 0.0);
        assert!(get_pricing("anthropic", "mystery").output_per_mtok > 0.0);
    }

    #[test]
    fn batch_usage_costs_half() {
        let pricing = get_pricing("anthropic", "claude-sonnet-4-20250514");
        let usage = TokenUsage {
            input_tokens: 1000,
            output_tokens: 500,
        };
        let sync = calculate_cost(&usage, &pricing, false);
        // 1000/1M * 3.0 + 500/1M * 15.0
        assert!(close(sync, 0.003 + 0.0075), "got {sync}");
        assert!(close(calculate_cost(&usage, &pricing, true), sync / 2.0));
    }

    #[test]
    fn zero_usage_costs_nothing() {
        let pricing = get_pricing("openai", "gpt-4o");
        assert_eq!(calculate_cost(&TokenUsage::default(), &pricing, false), 0.0);
    }
}
