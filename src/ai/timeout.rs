//! Timeout helper for async operations
//!
//! ```ignore
//! let report = with_timeout(
//!     Duration::from_secs(600),
//!     orchestrator.build_report(&job),
//!     "report pipeline",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{Result, ScreenerError};

/// Execute an async operation with a timeout
///
/// Returns `ScreenerError::Timeout` if the operation doesn't complete within
/// the specified duration. The operation is dropped on expiry.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ScreenerError::timeout(operation_name, timeout)),
    }
}

/// Apply `with_timeout` only when a limit is configured
pub async fn with_optional_timeout<T, F>(
    timeout: Option<Duration>,
    future: F,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(limit) => with_timeout(limit, future, operation_name).await,
        None => future.await,
    }
}
