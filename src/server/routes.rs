//! HTTP handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use crate::jobs::{JobId, JobStatus};
use crate::report::Report;
use crate::service::SharedService;
use crate::types::ScreenerError;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JobResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// `ScreenerError` rendered as `{"detail": ...}` with a matching status code
pub struct ApiError(ScreenerError);

impl From<ScreenerError> for ApiError {
    fn from(err: ScreenerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            ScreenerError::JobNotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "detail": "Job not found" }),
            ),
            ScreenerError::ReportNotReady { status } => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": self.0.to_string(), "status": status }),
            ),
            err if err.is_client_error() => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": err.to_string() }),
            ),
            err => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// POST /generate
pub async fn generate(
    State(service): State<SharedService>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job_id = service.request_report(&request.url)?;
    let status = service.job_status(&job_id)?;
    Ok(Json(JobResponse { job_id, status }))
}

/// GET /job/:job_id
pub async fn job_status(
    State(service): State<SharedService>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job_id = JobId::from(job_id);
    let status = service.job_status(&job_id)?;
    Ok(Json(JobResponse { job_id, status }))
}

/// GET /report/:job_id
pub async fn report(
    State(service): State<SharedService>,
    Path(job_id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(service.report(&JobId::from(job_id))?))
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "Company Screener API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/generate", "/job/{job_id}", "/report/{job_id}"],
    }))
}
