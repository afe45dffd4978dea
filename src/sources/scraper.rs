//! Company website pages via ScraperAPI
//!
//! Fetches a fixed list of common pages with JavaScript rendering and keeps
//! their visible text. Missing pages (404) are skipped; other page errors are
//! recorded under `<page>_error` without failing the source. Transport
//! failures fail the whole fetch.

use ::scraper::{Html, Selector};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::build_client;
use super::{DataSource, SourceData, SourceKind};
use crate::constants::sources::SCRAPER_URL;
use crate::types::{Result, ScreenerError};

const TARGET_PAGES: [(&str, &str); 10] = [
    ("home", "/"),
    ("about", "/about"),
    ("about-us", "/about-us"),
    ("team", "/team"),
    ("our-team", "/our-team"),
    ("leadership", "/leadership"),
    ("products", "/products"),
    ("solutions", "/solutions"),
    ("services", "/services"),
    ("careers", "/careers"),
];

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &str = "script, style, noscript, template";

/// Reduce an HTML document to its visible text.
///
/// Entities are decoded by the parser; comments and hidden elements are dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let hidden: HashSet<_> = Selector::parse(HIDDEN_ELEMENTS)
        .map(|selector| document.select(&selector).map(|element| element.id()).collect())
        .unwrap_or_default();

    let fragments: Vec<&str> = document
        .root_element()
        .descendants()
        .filter(|node| !node.ancestors().any(|a| hidden.contains(&a.id())))
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect();

    fragments
        .iter()
        .flat_map(|fragment| fragment.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ScraperSource {
    api_key: SecretString,
    endpoint: String,
    client: reqwest::Client,
}

impl ScraperSource {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            endpoint: SCRAPER_URL.to_string(),
            client: build_client(SourceKind::Scraper, timeout)?,
        })
    }
}

/// Absolute URLs of the target pages on the site's origin
fn page_urls(url: &str) -> Result<Vec<(&'static str, String)>> {
    let base = Url::parse(url).map_err(|e| {
        ScreenerError::provider(SourceKind::Scraper.as_str(), None, format!("bad URL: {e}"))
    })?;

    TARGET_PAGES
        .iter()
        .map(|(page, path)| {
            base.join(path)
                .map(|u| (*page, u.to_string()))
                .map_err(|e| {
                    ScreenerError::provider(SourceKind::Scraper.as_str(), None, e.to_string())
                })
        })
        .collect()
}

#[async_trait]
impl DataSource for ScraperSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Scraper
    }

    async fn fetch(&self, _company_name: &str, url: &str) -> Result<SourceData> {
        let mut pages = Map::new();

        for (page, page_url) in page_urls(url)? {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("api_key", self.api_key.expose_secret()),
                    ("url", page_url.as_str()),
                    ("render", "true"),
                ])
                .send()
                .await
                .map_err(|e| ScreenerError::provider(SourceKind::Scraper.as_str(), None, e.to_string()))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                debug!(page, "Page not found, skipping");
                continue;
            }
            if !status.is_success() {
                pages.insert(
                    format!("{page}_error"),
                    json!({ "url": page_url, "status_code": status.as_u16() }),
                );
                continue;
            }

            let html = response
                .text()
                .await
                .map_err(|e| ScreenerError::provider(SourceKind::Scraper.as_str(), None, e.to_string()))?;
            pages.insert(
                page.to_string(),
                json!({ "url": page_url, "text_content": html_to_text(&html) }),
            );
        }

        Ok(SourceData::new(Value::Object(pages)))
    }
}
