//! Research answers via Perplexity

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use std::time::Duration;

use super::http::{build_client, send_json};
use super::{DataSource, SourceData, SourceKind};
use crate::constants::sources::PERPLEXITY_URL;
use crate::types::Result;

/// Result category and the research question asked for it
fn research_queries(company_name: &str) -> [(&'static str, String); 6] {
    [
        (
            "business_model",
            format!("Detailed analysis of {company_name}'s business model and products"),
        ),
        (
            "market_analysis",
            format!("{company_name} market size, TAM, and growth potential"),
        ),
        (
            "competitive_landscape",
            format!("{company_name} competitors and competitive landscape"),
        ),
        (
            "financial_metrics",
            format!("{company_name} financial performance and key metrics"),
        ),
        (
            "fundraising",
            format!("{company_name} funding history and investors"),
        ),
        (
            "team",
            format!("{company_name} leadership team background and experience"),
        ),
    ]
}

pub struct PerplexitySource {
    api_key: SecretString,
    endpoint: String,
    client: reqwest::Client,
}

impl PerplexitySource {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            endpoint: PERPLEXITY_URL.to_string(),
            client: build_client(SourceKind::Perplexity, timeout)?,
        })
    }
}

#[async_trait]
impl DataSource for PerplexitySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Perplexity
    }

    async fn fetch(&self, company_name: &str, _url: &str) -> Result<SourceData> {
        let mut results = Map::new();

        for (category, query) in research_queries(company_name) {
            let request = self
                .client
                .post(&self.endpoint)
                .bearer_auth(self.api_key.expose_secret())
                .json(&json!({ "query": query, "focus": "search" }));
            let body = send_json(SourceKind::Perplexity, request).await?;
            results.insert(category.to_string(), body);
        }

        Ok(SourceData::new(Value::Object(results)))
    }
}
