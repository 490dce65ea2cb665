//! Pricing Table
//!
//! Maps a model identifier to its USD-per-million-token prices. The table is a plain value
//! built from [`PricingTable::builtin`] plus whatever the `[pricing]` config section adds, and is
//! handed to the classifier at construction. Lookups never fail: a model the table does not know
//! resolves to the designated default tier.

use crate::config::PricingConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

impl ModelPricing {
    pub const fn new(input: f64, output: f64, cache_read: f64, cache_write: f64) -> Self {
        Self {
            input,
            output,
            cache_read,
            cache_write,
        }
    }

    fn validate(&self, model: &str) -> Result<()> {
        for (name, price) in [
            ("input", self.input),
            ("output", self.output),
            ("cache_read", self.cache_read),
            ("cache_write", self.cache_write),
        ] {
            if !price.is_finite() || price < 0.0 {
                anyhow::bail!("Invalid {} price {} for model {}", name, price, model);
            }
        }
        if self.cache_read > self.input {
            warn!(
                model,
                input = self.input,
                cache_read = self.cache_read,
                "Cache read price exceeds input price, cache savings will be negative"
            );
        }
        Ok(())
    }
}

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const SONNET: ModelPricing = ModelPricing::new(3.0, 15.0, 0.30, 3.75);
const OPUS: ModelPricing = ModelPricing::new(15.0, 75.0, 1.50, 18.75);
const OPUS_45: ModelPricing = ModelPricing::new(5.0, 25.0, 0.50, 6.25);
const HAIKU_35: ModelPricing = ModelPricing::new(0.80, 4.0, 0.08, 1.0);
const HAIKU_45: ModelPricing = ModelPricing::new(1.0, 5.0, 0.10, 1.25);

const BUILTIN: &[(&str, ModelPricing)] = &[
    ("claude-sonnet-4-20250514", SONNET),
    ("claude-sonnet-4-5-20250929", SONNET),
    ("claude-3-7-sonnet-20250219", SONNET),
    ("claude-3-5-sonnet-20241022", SONNET),
    ("claude-opus-4-20250514", OPUS),
    ("claude-opus-4-1-20250805", OPUS),
    ("claude-opus-4-5-20251101", OPUS_45),
    ("claude-3-opus-20240229", OPUS),
    ("claude-3-5-haiku-20241022", HAIKU_35),
    ("claude-haiku-4-5-20251001", HAIKU_45),
];

#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
    default: ModelPricing,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PricingTable {
    /// Built-in Claude prices with Sonnet 4 as the default tier.
    pub fn builtin() -> Self {
        let models = BUILTIN
            .iter()
            .map(|(model, pricing)| (model.to_string(), *pricing))
            .collect();
        Self {
            models,
            default: SONNET,
        }
    }

    /// Build a table from an explicit mapping; `default` prices every unknown model.
    pub fn new(models: HashMap<String, ModelPricing>, default: ModelPricing) -> Self {
        Self { models, default }
    }

    /// Built-in table overlaid with the configured models and default tier.
    pub fn from_config(config: &PricingConfig) -> Result<Self> {
        let mut table = Self::builtin();
        for (model, pricing) in &config.models {
            pricing.validate(model)?;
            table.models.insert(model.clone(), *pricing);
        }
        table.default = table
            .models
            .get(&config.default_model)
            .copied()
            .with_context(|| {
                format!(
                    "Default pricing model {} is not in the pricing table",
                    config.default_model
                )
            })?;
        debug!(
            models = table.models.len(),
            default_model = %config.default_model,
            "Pricing table ready"
        );
        Ok(table)
    }

    /// Prices for `model`, or the default tier when the model is unknown.
    pub fn lookup(&self, model: &str) -> &ModelPricing {
        self.get(model).unwrap_or(&self.default)
    }

    pub fn get(&self, model: &str) -> Option<&ModelPricing> {
        self.models.get(model)
    }

    pub fn default_pricing(&self) -> &ModelPricing {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
