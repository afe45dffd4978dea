//! HTTP plumbing shared by the vendor adapters

use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::SourceKind;
use crate::types::{Result, ScreenerError};

/// Longest error body kept in a provider error message
const MAX_ERROR_BODY: usize = 300;

pub(super) fn build_client(kind: SourceKind, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ScreenerError::Config(format!("Failed to create {} HTTP client: {}", kind, e)))
}

/// Send a request and decode a JSON body; any non-2xx status is a provider error
pub(super) async fn send_json(kind: SourceKind, request: RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| ScreenerError::provider(kind.as_str(), None, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(kind, status, &body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ScreenerError::provider(kind.as_str(), None, format!("invalid JSON: {e}")))
}

pub(super) fn status_error(kind: SourceKind, status: StatusCode, body: &str) -> ScreenerError {
    let mut message = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let body = body.trim();
    if !body.is_empty() {
        let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
        message = format!("{message}: {snippet}");
    }
    ScreenerError::provider(kind.as_str(), Some(status.as_u16()), message)
}

/// Local HTTP doubles for adapter tests
#[cfg(test)]
pub(super) mod testing {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral loopback port and return its base URL
    pub async fn serve_locally(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{address}")
    }

    /// Client that never routes loopback traffic through an environment proxy
    pub fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }
}
