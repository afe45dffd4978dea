//! In-process LLM backend for tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use super::generator::TextGenerator;
use super::provider::{ChatRequest, Completion, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::types::{ErrorCategory, LlmError, Result, ScreenerError};

type Responder = dyn Fn(&ChatRequest, usize) -> Result<Completion> + Send + Sync;

/// Scripted provider: the responder sees each request and the number of calls before it
pub(crate) struct FakeProvider {
    respond: Box<Responder>,
    calls: Mutex<Vec<(Instant, ChatRequest)>>,
}

impl FakeProvider {
    pub fn new(
        respond: impl Fn(&ChatRequest, usize) -> Result<Completion> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with a fixed text
    pub fn constant(text: &'static str) -> Self {
        Self::new(move |_, _| Ok(completion(text)))
    }

    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), request.clone()));
            calls.len() - 1
        };
        (self.respond)(request, attempt)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub(crate) fn completion(text: &str) -> Completion {
    Completion {
        text: text.to_string(),
        usage: TokenUsage::from_openai(100, 50),
        model: "fake".to_string(),
    }
}

pub(crate) fn rate_limited() -> ScreenerError {
    LlmError::with_provider(ErrorCategory::RateLimit, "429 Too Many Requests", "fake").into()
}

/// The last user message of a request
pub(crate) fn user_prompt(request: &ChatRequest) -> &str {
    request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

pub(crate) fn fake_generator(provider: Arc<FakeProvider>) -> Arc<TextGenerator> {
    Arc::new(TextGenerator::new(provider, &LlmConfig::default()))
}
