//! HTTP transport for [`ReportService`]
//!
//! | Route | Response |
//! |---|---|
//! | `POST /generate {url}` | `{job_id, status}`; 400 for a bad URL |
//! | `GET /job/:id` | `{job_id, status}`; 404 if unknown |
//! | `GET /report/:id` | the report; 400 until completed, 404 if unknown |
//! | `GET /` | service info |

pub mod routes;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::service::{ReportService, SharedService};
use crate::types::Result;

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/generate", post(routes::generate))
        .route("/job/:job_id", get(routes::job_status))
        .route("/report/:job_id", get(routes::report))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: &Config) -> Result<()> {
    let service = Arc::new(ReportService::from_config(config)?);
    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;

    info!(address = %address, "Company screener listening");
    axum::serve(listener, router(service)).await?;
    Ok(())
}
