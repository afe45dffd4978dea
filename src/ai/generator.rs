//! Text Generator Adapter
//!
//! Uniform "prompt in, text out" capability over an `LlmProvider`:
//!
//! - picks the calling convention from the model id ([`ChatConvention`])
//! - retries throttled calls with exponential backoff (`backon`)
//! - prices every successful call and adds it to the shared [`CostAccumulator`]
//!
//! One instance is built per process and handed to every consumer.

use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::convention::{ChatConvention, Sampling};
use super::metrics::{CostAccumulator, SharedCosts, UsageSnapshot};
use super::pricing;
use super::provider::SharedProvider;
use crate::config::LlmConfig;
use crate::constants::{llm, retry};
use crate::types::{Result, ScreenerError};

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounded exponential backoff applied to rate-limited calls only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Multiplier between consecutive delays
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            factor: retry::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Policy from config, clamped to the accepted ranges
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.clamp(1, retry::MAX_ATTEMPTS_LIMIT),
            base_delay: Duration::from_millis(
                config.retry_base_delay_ms.min(retry::MAX_BASE_DELAY_MS),
            ),
            ..Self::default()
        }
    }

    /// Nominal delay before retry `n` (0-based): `base × factor^n`, saturating
    /// at `MAX_DELAY_SECS`
    pub fn delay_for(&self, n: u32) -> Duration {
        let ceiling = Duration::from_secs(retry::MAX_DELAY_SECS);
        let exponent = i32::try_from(n).unwrap_or(i32::MAX);
        let scaled = self.base_delay.as_secs_f64() * f64::from(self.factor).powi(exponent);
        Duration::try_from_secs_f64(scaled)
            .map_or(ceiling, |delay| delay.min(ceiling))
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        let retries = self.max_attempts.saturating_sub(1);
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(self.factor)
            .with_max_delay(self.delay_for(retries))
            .with_max_times(retries as usize)
    }
}

// =============================================================================
// Generate Options
// =============================================================================

/// Per-call overrides; unset fields use the generator's defaults
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub model: Option<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// =============================================================================
// Text Generator
// =============================================================================

pub struct TextGenerator {
    provider: SharedProvider,
    costs: SharedCosts,
    retry: RetryPolicy,
    model: String,
    search_model: String,
    sampling: Sampling,
}

/// Shared generator handle
pub type SharedGenerator = Arc<TextGenerator>;

impl TextGenerator {
    pub fn new(provider: SharedProvider, config: &LlmConfig) -> Self {
        Self {
            provider,
            costs: Arc::new(CostAccumulator::new()),
            retry: RetryPolicy::from_config(config),
            model: config.model.clone(),
            search_model: config.search_model.clone(),
            sampling: Sampling {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                seed: config.seed,
            },
        }
    }

    pub fn with_costs(mut self, costs: SharedCosts) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn costs(&self) -> &SharedCosts {
        &self.costs
    }

    pub fn usage(&self) -> UsageSnapshot {
        self.costs.snapshot()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn search_model(&self) -> &str {
        &self.search_model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate text for `prompt`.
    ///
    /// Rate-limited attempts are retried per the [`RetryPolicy`]; exhausting
    /// them yields `RateLimited`. Other failures return immediately. The
    /// call's cost is recorded only after a successful response, and an
    /// unpriced model fails with `UnknownModel`.
    pub async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let convention = ChatConvention::for_model(model);
        let sampling = Sampling {
            temperature: options.temperature.unwrap_or(self.sampling.temperature),
            ..self.sampling
        };
        let system_prompt = options
            .system_prompt
            .as_deref()
            .unwrap_or(llm::DEFAULT_SYSTEM_PROMPT);
        let request = convention.build_request(model, prompt, system_prompt, sampling);

        let mut retries: u64 = 0;
        let outcome = (|| self.provider.complete(&request))
            .retry(self.retry.backoff())
            .sleep(tokio::time::sleep)
            .when(ScreenerError::is_rate_limited)
            .notify(|err: &ScreenerError, delay: Duration| {
                retries += 1;
                warn!(
                    model,
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Rate limited, backing off"
                );
            })
            .await;
        self.costs.record_retries(retries);

        let completion = outcome.map_err(|err| {
            if err.is_rate_limited() {
                ScreenerError::RateLimited {
                    attempts: self.retry.max_attempts,
                    message: err.to_string(),
                }
            } else {
                err
            }
        })?;

        let cost = pricing::cost_of(model, &completion.usage)?;
        self.costs.record(model, &completion.usage, cost);

        debug!(
            model,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            cost = %cost,
            "Generation complete"
        );

        Ok(completion.text)
    }

    /// Generate with the search model (user-only convention)
    pub async fn search(&self, prompt: &str) -> Result<String> {
        let options = GenerateOptions::new().model(self.search_model.clone());
        self.generate(prompt, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::pricing::cost_of;
    use crate::ai::provider::{Role, TokenUsage};
    use crate::ai::testing::{FakeProvider, completion, rate_limited};
    use crate::types::{ErrorCategory, LlmError};
    use futures::future::join_all;

    fn generator(provider: Arc<FakeProvider>) -> TextGenerator {
        TextGenerator::new(provider, &LlmConfig::default())
    }

    #[test]
    fn test_default_policy_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..5).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_attempts: 100,
            base_delay: Duration::from_secs(1),
            factor: 2.0,
        };
        let ceiling = Duration::from_secs(retry::MAX_DELAY_SECS);
        assert_eq!(policy.delay_for(99), ceiling);
        assert_eq!(policy.delay_for(u32::MAX), ceiling);
        let _ = policy.backoff();
    }

    #[test]
    fn test_from_config_clamps_out_of_range_values() {
        let config = LlmConfig {
            max_attempts: 100,
            retry_base_delay_ms: u64::MAX,
            ..LlmConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, retry::MAX_ATTEMPTS_LIMIT);
        assert_eq!(
            policy.base_delay,
            Duration::from_millis(retry::MAX_BASE_DELAY_MS)
        );
        let _ = policy.backoff();
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limit() {
        let provider = Arc::new(FakeProvider::new(|_, attempt| {
            if attempt < 2 {
                Err(rate_limited())
            } else {
                Ok(completion("Acme builds robots."))
            }
        }));
        let generator = generator(Arc::clone(&provider));

        let start = tokio::time::Instant::now();
        let text = generator.generate("overview", &GenerateOptions::new()).await.unwrap();

        assert_eq!(text, "Acme builds robots.");
        assert_eq!(provider.call_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert_eq!(generator.usage().retries, 2);
        assert_eq!(generator.usage().calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_rate_limited() {
        let provider = Arc::new(FakeProvider::new(|_, _| Err(rate_limited())));
        let generator = generator(Arc::clone(&provider));

        let err = generator
            .generate("overview", &GenerateOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScreenerError::RateLimited { attempts: 5, .. }));
        assert_eq!(provider.call_count(), 5);

        let times = provider.call_times();
        let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
        // nothing succeeded, nothing billed
        assert_eq!(generator.usage().calls, 0);
        assert_eq!(generator.usage().total_cost.micro_cents(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failures_are_not_retried() {
        let provider = Arc::new(FakeProvider::new(|_, _| {
            Err(LlmError::with_provider(ErrorCategory::Auth, "bad key", "fake").into())
        }));
        let generator = generator(Arc::clone(&provider));

        let start = tokio::time::Instant::now();
        let err = generator
            .generate("overview", &GenerateOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScreenerError::Llm(ref e) if e.category == ErrorCategory::Auth));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_model_fails_call() {
        let provider = Arc::new(FakeProvider::new(|_, _| Ok(completion("text"))));
        let generator = generator(Arc::clone(&provider));

        let err = generator
            .generate("prompt", &GenerateOptions::new().model("homegrown-7b"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScreenerError::UnknownModel(ref m) if m == "homegrown-7b"));
        assert_eq!(generator.usage().calls, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_accumulate_exactly() {
        let provider = Arc::new(FakeProvider::new(|_, _| Ok(completion("ok"))));
        let generator = Arc::new(generator(provider));
        let per_call = cost_of(
            crate::constants::llm::DEFAULT_MODEL,
            &TokenUsage::from_openai(100, 50),
        )
        .unwrap();

        let calls = (0..64).map(|_| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                generator.generate("p", &GenerateOptions::new()).await
            })
        });
        for joined in join_all(calls).await {
            joined.unwrap().unwrap();
        }

        let usage = generator.usage();
        assert_eq!(usage.calls, 64);
        assert_eq!(usage.total_cost.micro_cents(), 64 * per_call.micro_cents());
    }

    #[tokio::test]
    async fn test_conventions_and_overrides() {
        let provider = Arc::new(FakeProvider::new(|_, _| Ok(completion("ok"))));
        let generator = generator(Arc::clone(&provider));

        generator.search("Who founded acme.co?").await.unwrap();
        generator.generate("Write it", &GenerateOptions::new()).await.unwrap();
        generator
            .generate(
                "Write it",
                &GenerateOptions::new()
                    .system_prompt("You are a market analyst")
                    .temperature(0.1),
            )
            .await
            .unwrap();

        let calls = provider.calls();
        assert_eq!(calls[0].model, "gpt-4o-search-preview");
        assert_eq!(calls[0].messages.len(), 1);
        assert!(calls[0].seed.is_none());

        assert_eq!(calls[1].messages[0].role, Role::System);
        assert_eq!(calls[1].messages[0].content, "You are an AI publishing assistant");
        assert_eq!(calls[1].seed, Some(666));
        assert_eq!(calls[1].temperature, Some(0.5));

        assert_eq!(calls[2].messages[0].content, "You are a market analyst");
        assert_eq!(calls[2].temperature, Some(0.1));
    }
}
