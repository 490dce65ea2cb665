use crate::models::{CostBreakdown, Usage};
use crate::pricing::PricingTable;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Token counts of one assistant turn, in the shape the cost formula reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
}

impl From<&Usage> for TokenCounts {
    fn from(usage: &Usage) -> Self {
        Self {
            input: usage.input_tokens,
            output: usage.output_tokens,
            cache_read: usage.cache_read_input_tokens,
            cache_write: usage.cache_creation_input_tokens,
        }
    }
}

/// Actual cost, no-cache cost and cache savings for `tokens` billed as `model`.
///
/// Terms are summed unrounded and each total is rounded to 4 decimals once. The no-cache
/// cost bills cache reads at the full input price and keeps every other term.
pub fn calculate_cost(pricing: &PricingTable, model: &str, tokens: TokenCounts) -> CostBreakdown {
    let prices = pricing.lookup(model);

    let input = per_million(tokens.input, prices.input);
    let output = per_million(tokens.output, prices.output);
    let cache_write = per_million(tokens.cache_write, prices.cache_write);

    let actual =
        round4(input + output + per_million(tokens.cache_read, prices.cache_read) + cache_write);
    let without_cache =
        round4(input + output + per_million(tokens.cache_read, prices.input) + cache_write);

    CostBreakdown {
        actual,
        without_cache,
        savings: round4(without_cache - actual),
    }
}

fn per_million(tokens: u64, price: f64) -> f64 {
    tokens as f64 / TOKENS_PER_MILLION * price
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
