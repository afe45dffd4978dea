//! Google search results via Serper

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

use super::http::{build_client, send_json};
use super::{DataSource, SourceData, SourceKind};
use crate::constants::sources::{SERPER_RESULTS_PER_QUERY, SERPER_URL};
use crate::types::Result;

/// Query suffixes; results are keyed by suffix
const QUERY_TOPICS: [&str; 8] = [
    "company overview",
    "business model",
    "products services",
    "market size",
    "competitors",
    "revenue financial metrics",
    "funding investment rounds",
    "team executives management",
];

pub struct SerperSource {
    api_key: SecretString,
    endpoint: String,
    client: reqwest::Client,
}

impl SerperSource {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            endpoint: SERPER_URL.to_string(),
            client: build_client(SourceKind::Serper, timeout)?,
        })
    }
}

fn search_payload(company_name: &str, topic: &str) -> Value {
    json!({
        "q": format!("{company_name} {topic}"),
        "num": SERPER_RESULTS_PER_QUERY,
    })
}

#[async_trait]
impl DataSource for SerperSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Serper
    }

    async fn fetch(&self, company_name: &str, _url: &str) -> Result<SourceData> {
        let mut results = Map::new();

        for topic in QUERY_TOPICS {
            let request = self
                .client
                .post(&self.endpoint)
                .header("X-API-KEY", self.api_key.expose_secret())
                .json(&search_payload(company_name, topic));
            let body = send_json(SourceKind::Serper, request).await?;
            results.insert(topic.to_string(), body);
        }

        debug!(queries = results.len(), "Serper search complete");
        Ok(SourceData::new(Value::Object(results)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_payload() {
        let payload = search_payload("Acme Robotics", "market size");
        assert_eq!(payload["q"], "Acme Robotics market size");
        assert_eq!(payload["num"], 10);
    }

    #[test]
    fn test_topics_cover_every_section() {
        // section prompts look these keys up by name
        for key in ["company overview", "competitors", "funding investment rounds"] {
            assert!(QUERY_TOPICS.contains(&key));
        }
    }
}
