//! Funding rounds and investors via Tracxn
//!
//! search (up to 5 candidates) → pick the candidate whose domain matches the
//! company URL, else the first → funding rounds, investors, company details.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::http::{build_client, send_json};
use super::{DataSource, SourceData, SourceKind};
use crate::constants::sources::{TRACXN_SEARCH_LIMIT, TRACXN_URL};
use crate::jobs::JobInput;
use crate::types::Result;

pub struct TracxnSource {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl TracxnSource {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: TRACXN_URL.to_string(),
            client: build_client(SourceKind::Tracxn, timeout)?,
        })
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret());
        send_json(SourceKind::Tracxn, request).await
    }
}

/// Candidate whose domain (ignoring `www.`) is `domain`, else the first candidate
fn pick_company<'a>(candidates: &'a [Value], domain: &str) -> Option<&'a Value> {
    candidates
        .iter()
        .find(|c| {
            c.get("domain")
                .and_then(Value::as_str)
                .map(|d| d.strip_prefix("www.").unwrap_or(d))
                == Some(domain)
        })
        .or_else(|| candidates.first())
}

fn company_id(company: &Value) -> Option<String> {
    match company.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl DataSource for TracxnSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Tracxn
    }

    async fn fetch(&self, company_name: &str, url: &str) -> Result<SourceData> {
        let domain = JobInput::parse(url)?.domain;

        let request = self
            .client
            .post(format!("{}/companies/search", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "query": company_name, "limit": TRACXN_SEARCH_LIMIT }));
        let search = send_json(SourceKind::Tracxn, request).await?;

        let candidates = search
            .get("companies")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let Some((company, id)) = pick_company(candidates, &domain)
            .and_then(|c| company_id(c).map(|id| (c.clone(), id)))
        else {
            debug!(company = company_name, "No Tracxn company match");
            return Ok(SourceData::new(json!({
                "company_info": {},
                "funding_rounds": [],
                "investors": [],
            })));
        };

        let funding = self.get(&format!("/companies/{id}/funding_rounds")).await?;
        let investors = self.get(&format!("/companies/{id}/investors")).await?;
        let details = self.get(&format!("/companies/{id}")).await?;

        Ok(SourceData::new(json!({
            "company_info": company,
            "funding_rounds": funding.get("fundingRounds").cloned().unwrap_or_else(|| json!([])),
            "investors": investors.get("investors").cloned().unwrap_or_else(|| json!([])),
            "company_details": details,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::testing::{local_client, serve_locally};
    use crate::types::ScreenerError;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    fn source(base_url: String) -> TracxnSource {
        TracxnSource {
            api_key: SecretString::from("t-key".to_string()),
            base_url,
            client: local_client(),
        }
    }

    fn search_route(candidates: Value) -> Router {
        Router::new().route(
            "/companies/search",
            post(move || {
                let candidates = candidates.clone();
                async move { Json(json!({ "companies": candidates })) }
            }),
        )
    }

    fn detail_routes() -> Router {
        Router::new()
            .route(
                "/companies/:id/funding_rounds",
                get(|Path(id): Path<String>| async move {
                    Json(json!({ "fundingRounds": [{ "company": id, "amount": 5_000_000 }] }))
                }),
            )
            .route(
                "/companies/:id/investors",
                get(|| async { Json(json!({ "investors": [{ "name": "Seed Fund" }] })) }),
            )
            .route(
                "/companies/:id",
                get(|Path(id): Path<String>| async move { Json(json!({ "id": id, "stage": "Series A" })) }),
            )
    }

    #[tokio::test]
    async fn test_fetch_prefers_exact_domain_match() {
        let candidates = json!([
            { "id": 1, "domain": "acme.com", "name": "Acme Inc" },
            { "id": 2, "domain": "www.acme.co", "name": "Acme Robotics" },
        ]);
        let base = serve_locally(search_route(candidates).merge(detail_routes())).await;

        let data = source(base)
            .fetch("acme", "https://www.acme.co:8443/about")
            .await
            .unwrap();

        assert_eq!(data.payload["company_info"]["name"], "Acme Robotics");
        assert_eq!(data.payload["funding_rounds"][0]["company"], "2");
        assert_eq!(data.payload["investors"][0]["name"], "Seed Fund");
        assert_eq!(data.payload["company_details"]["id"], "2");
        assert!(data.company_name.is_none());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_first_candidate() {
        let candidates = json!([
            { "id": "t-1", "domain": "acme.com" },
            { "id": "t-2", "domain": "acme.io" },
        ]);
        let base = serve_locally(search_route(candidates).merge(detail_routes())).await;

        let data = source(base).fetch("acme", "https://acme.co/").await.unwrap();
        assert_eq!(data.payload["company_details"]["id"], "t-1");
    }

    #[tokio::test]
    async fn test_fetch_without_match_is_empty() {
        let base = serve_locally(search_route(json!([]))).await;

        let data = source(base).fetch("acme", "https://acme.co/").await.unwrap();
        assert_eq!(
            data.payload,
            json!({ "company_info": {}, "funding_rounds": [], "investors": [] })
        );
    }

    #[tokio::test]
    async fn test_failed_detail_request_fails_fetch() {
        let router = search_route(json!([{ "id": 2, "domain": "acme.co" }])).route(
            "/companies/:id/funding_rounds",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve_locally(router).await;

        let err = source(base).fetch("acme", "https://acme.co/").await.unwrap_err();
        assert!(matches!(
            err,
            ScreenerError::Provider { ref source_name, status: Some(503), .. } if source_name == "tracxn"
        ));
    }

    #[test]
    fn test_pick_prefers_domain_match() {
        let candidates = vec![
            json!({"id": 1, "domain": "acme.com"}),
            json!({"id": 2, "domain": "acme.co"}),
            json!({"id": 3, "domain": "www.acme.io"}),
        ];
        assert_eq!(pick_company(&candidates, "acme.co").unwrap()["id"], 2);
        assert_eq!(pick_company(&candidates, "acme.io").unwrap()["id"], 3);
        assert_eq!(pick_company(&candidates, "other.io").unwrap()["id"], 1);
        assert!(pick_company(&[], "acme.co").is_none());
    }

    #[test]
    fn test_company_id() {
        assert_eq!(company_id(&json!({"id": "t-9"})), Some("t-9".to_string()));
        assert_eq!(company_id(&json!({"id": 9})), Some("9".to_string()));
        assert_eq!(company_id(&json!({})), None);
    }
}
