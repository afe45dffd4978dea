//! AI Integration Layer
//!
//! LLM backend abstraction plus the text generator that every data source and
//! report section shares.

pub mod convention;
pub mod generator;
pub mod metrics;
pub mod pricing;
pub mod provider;
pub mod timeout;
pub mod web_answer;

#[cfg(test)]
pub(crate) mod testing;

pub use convention::{ChatConvention, Sampling};
pub use generator::{GenerateOptions, RetryPolicy, SharedGenerator, TextGenerator};
pub use metrics::{CostAccumulator, ModelUsage, SharedCosts, UsageSnapshot};
pub use pricing::{Cost, ModelPrice, cost_of, price_for};
pub use provider::{
    ChatMessage, ChatRequest, Completion, LlmProvider, OpenAiProvider, Role, SharedProvider,
    TokenUsage, create_provider,
};
pub use timeout::{with_optional_timeout, with_timeout};
pub use web_answer::WebAnswer;
