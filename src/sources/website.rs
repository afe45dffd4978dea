//! Site-restricted web research through the search model
//!
//! Asks the search model one question per topic, restricted to the company's
//! own domain, and runs the lookups concurrently. Lookups never fail (they
//! fall back to `N/A`), so this source only fails on a bad URL.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{DataSource, SourceData, SourceKind};
use crate::ai::SharedGenerator;
use crate::ai::web_answer::{lookup, site_prompt};
use crate::jobs::JobInput;
use crate::types::Result;

/// Payload key and the question asked for it
const TOPICS: [(&str, &str); 5] = [
    ("company_name", "What is the name of the company?"),
    (
        "business_model",
        "What is the business model of the company and how does it make money?",
    ),
    (
        "products_services",
        "What products or services does the company offer?",
    ),
    (
        "market",
        "What market or industry does the company operate in and who are its customers?",
    ),
    (
        "team",
        "Who are the founders and leadership team of the company?",
    ),
];

pub struct WebsiteSource {
    generator: SharedGenerator,
}

impl WebsiteSource {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl DataSource for WebsiteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Website
    }

    async fn fetch(&self, _company_name: &str, url: &str) -> Result<SourceData> {
        let domain = JobInput::parse(url)?.domain;

        let answers = join_all(TOPICS.iter().map(|(key, question)| {
            let prompt = site_prompt(question, &domain);
            let generator = &self.generator;
            async move { (*key, lookup(generator, &prompt).await) }
        }))
        .await;

        let mut payload = Map::new();
        let mut resolved_name = None;
        for (key, answer) in answers {
            if key == "company_name" && answer.is_available() {
                resolved_name = Some(answer.content.trim().to_string());
            }
            payload.insert(
                key.to_string(),
                json!({ "content": answer.content, "link": answer.link }),
            );
        }

        debug!(domain = %domain, name = ?resolved_name, "Website research complete");
        let data = SourceData::new(Value::Object(payload));
        Ok(match resolved_name {
            Some(name) => data.with_company_name(name),
            None => data,
        })
    }
}
