//! Model price table
//!
//! Prices are USD per million tokens. They are stored as whole cents per
//! million so a call's cost is an exact integer number of micro-cents:
//! `tokens × cents_per_million` micro-cents.

use serde::Serialize;

use super::provider::TokenUsage;
use crate::types::{Result, ScreenerError};

/// Prompt and completion price for one model, in cents per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPrice {
    pub prompt_cents_per_million: u64,
    pub completion_cents_per_million: u64,
}

const fn price(prompt: u64, completion: u64) -> ModelPrice {
    ModelPrice {
        prompt_cents_per_million: prompt,
        completion_cents_per_million: completion,
    }
}

const PRICE_TABLE: &[(&str, ModelPrice)] = &[
    ("gpt-4.1-2025-04-14", price(200, 800)),
    ("gpt-4o-2024-11-20", price(250, 1_000)),
    ("gpt-4o-2024-05-13", price(500, 1_500)),
    ("o1-mini", price(300, 1_200)),
    ("o1-preview", price(1_500, 6_000)),
    ("gpt-4o", price(250, 1_000)),
    ("gpt-4o-mini", price(15, 60)),
    ("gpt-4o-search-preview", price(250, 1_000)),
];

/// Look up a model by exact identifier
pub fn price_for(model: &str) -> Result<ModelPrice> {
    PRICE_TABLE
        .iter()
        .find(|(id, _)| *id == model)
        .map(|(_, p)| *p)
        .ok_or_else(|| ScreenerError::UnknownModel(model.to_string()))
}

pub fn known_models() -> impl Iterator<Item = &'static str> {
    PRICE_TABLE.iter().map(|(id, _)| *id)
}

/// Monetary amount in micro-cents (1 USD = 10^8 micro-cents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cost(u64);

impl Cost {
    pub const ZERO: Self = Self(0);

    pub const fn from_micro_cents(micro_cents: u64) -> Self {
        Self(micro_cents)
    }

    pub const fn micro_cents(self) -> u64 {
        self.0
    }

    pub fn as_usd(self) -> f64 {
        self.0 as f64 / 100_000_000.0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::ops::Add for Cost {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl std::ops::AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.6}", self.as_usd())
    }
}

impl ModelPrice {
    /// (prompt tokens × prompt price + completion tokens × completion price) / 1M, exactly
    pub fn cost(&self, usage: &TokenUsage) -> Cost {
        let prompt = u64::from(usage.input_tokens) * self.prompt_cents_per_million;
        let completion = u64::from(usage.output_tokens) * self.completion_cents_per_million;
        Cost(prompt + completion)
    }
}

/// Cost of one call to `model`; `UnknownModel` when the model is not priced
pub fn cost_of(model: &str, usage: &TokenUsage) -> Result<Cost> {
    Ok(price_for(model)?.cost(usage))
}
