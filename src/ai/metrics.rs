//! Usage and Cost Accounting
//!
//! Process-wide ledger of LLM usage owned by a `TextGenerator`. Every
//! successful call adds its tokens and cost under one mutex, so concurrent
//! callers never lose an update.
//!
//! ## Usage
//!
//! ```ignore
//! let costs = CostAccumulator::new();
//! costs.record("gpt-4o", &usage, cost);
//! let snapshot = costs.snapshot();
//! println!("{}", snapshot.display());
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::warn;

use super::pricing::Cost;
use super::provider::TokenUsage;

// =============================================================================
// Cost Accumulator
// =============================================================================

/// Thread-safe running total of LLM usage and cost.
pub struct CostAccumulator {
    started: Instant,
    ledger: Mutex<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    calls: u64,
    input_tokens: u64,
    output_tokens: u64,
    retries: u64,
    total_cost: Cost,
    by_model: BTreeMap<String, ModelUsage>,
}

/// Usage attributed to one model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelUsage {
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Cost,
}

/// Point-in-time copy of the ledger
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub elapsed_ms: u64,
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub retries: u64,
    pub total_cost: Cost,
    pub by_model: BTreeMap<String, ModelUsage>,
}

impl Default for CostAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostAccumulator {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| {
            warn!("Cost ledger lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Record one successful call
    pub fn record(&self, model: &str, usage: &TokenUsage, cost: Cost) {
        let mut ledger = self.lock();
        ledger.calls += 1;
        ledger.input_tokens += u64::from(usage.input_tokens);
        ledger.output_tokens += u64::from(usage.output_tokens);
        ledger.total_cost += cost;

        let entry = ledger.by_model.entry(model.to_string()).or_default();
        entry.calls += 1;
        entry.input_tokens += u64::from(usage.input_tokens);
        entry.output_tokens += u64::from(usage.output_tokens);
        entry.cost += cost;
    }

    /// Record rate-limit retries performed by one call
    pub fn record_retries(&self, retries: u64) {
        if retries > 0 {
            self.lock().retries += retries;
        }
    }

    pub fn total_cost(&self) -> Cost {
        self.lock().total_cost
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let ledger = self.lock();
        UsageSnapshot {
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            calls: ledger.calls,
            input_tokens: ledger.input_tokens,
            output_tokens: ledger.output_tokens,
            retries: ledger.retries,
            total_cost: ledger.total_cost,
            by_model: ledger.by_model.clone(),
        }
    }
}

impl UsageSnapshot {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Human-readable multi-line summary
    pub fn display(&self) -> String {
        let mut lines = vec![
            format!(
                "LLM calls: {} ({} retries)",
                self.calls, self.retries
            ),
            format!(
                "Tokens: {} input, {} output, {} total",
                self.input_tokens,
                self.output_tokens,
                self.total_tokens()
            ),
            format!("Cost: {}", self.total_cost),
        ];
        for (model, usage) in &self.by_model {
            lines.push(format!(
                "  {}: {} calls, {} tokens, {}",
                model,
                usage.calls,
                usage.input_tokens + usage.output_tokens,
                usage.cost
            ));
        }
        lines.join("\n")
    }
}

/// Shared accumulator reference
pub type SharedCosts = Arc<CostAccumulator>;
