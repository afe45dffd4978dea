//! LinkedIn company and people data via CoreSignal
//!
//! search (top match) → company profile → executive listing → person
//! profiles for the first few executives. A failed person lookup records
//! `null` for that profile; every other failure fails the fetch.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use super::http::{build_client, send_json};
use super::{DataSource, SourceData, SourceKind};
use crate::constants::sources::{
    CORESIGNAL_EMPLOYEE_LIMIT, CORESIGNAL_PROFILE_LIMIT, CORESIGNAL_URL,
};
use crate::types::Result;

const EXECUTIVE_TITLES: [&str; 11] = [
    "CEO",
    "CTO",
    "CFO",
    "COO",
    "Chief",
    "Director",
    "VP",
    "Head",
    "President",
    "Founder",
    "Co-founder",
];

pub struct CoreSignalSource {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl CoreSignalSource {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: CORESIGNAL_URL.to_string(),
            client: build_client(SourceKind::Coresignal, timeout)?,
        })
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret());
        send_json(SourceKind::Coresignal, request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .json(body);
        send_json(SourceKind::Coresignal, request).await
    }
}

fn employees_filter() -> Value {
    json!({
        "limit": CORESIGNAL_EMPLOYEE_LIMIT,
        "filters": {
            "position_title": { "contains_any": EXECUTIVE_TITLES }
        }
    })
}

/// Id of an entity as a path segment (CoreSignal ids may be numbers or strings)
fn entity_id(entity: &Value) -> Option<String> {
    match entity.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl DataSource for CoreSignalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Coresignal
    }

    async fn fetch(&self, company_name: &str, _url: &str) -> Result<SourceData> {
        let search = self
            .post(
                "/linkedin/company/search",
                &json!({ "query": company_name, "limit": 1 }),
            )
            .await?;

        let Some(company_id) = search
            .get("results")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .and_then(entity_id)
        else {
            debug!(company = company_name, "No LinkedIn company match");
            return Ok(SourceData::new(
                json!({ "company_profile": {}, "employees": [] }),
            ));
        };

        let company_profile = self.get(&format!("/linkedin/company/{company_id}")).await?;

        let listing = self
            .post(
                &format!("/linkedin/company/{company_id}/employees"),
                &employees_filter(),
            )
            .await?;
        let mut employees: Vec<Value> = listing
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for employee in employees.iter_mut().take(CORESIGNAL_PROFILE_LIMIT) {
            let profile = match entity_id(employee) {
                Some(person_id) => match self.get(&format!("/linkedin/person/{person_id}")).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        warn!(person_id, error = %e, "Person profile lookup failed");
                        Value::Null
                    }
                },
                None => Value::Null,
            };
            if let Value::Object(fields) = employee {
                fields.insert("detailed_profile".to_string(), profile);
            }
        }

        Ok(SourceData::new(json!({
            "company_profile": company_profile,
            "employees": employees,
        })))
    }
}
