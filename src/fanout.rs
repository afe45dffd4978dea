//! Fan-Out Collector
//!
//! Runs independent async operations concurrently and hands back one outcome
//! per operation, in input order, whatever order they finish in. A failing or
//! panicking operation becomes an `Err` entry; its siblings keep running.
//!
//! The collector never retries. Operations that need retry carry their own
//! policy (see `ai::generator`).
//!
//! ## Usage
//!
//! ```ignore
//! let fanout = FanOut::bounded(4);
//! let outcomes = fanout
//!     .collect_labeled(sources.iter().map(|s| (s.kind(), s.fetch(&name, &url))))
//!     .await;
//! ```

use futures::FutureExt;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::types::{Result, ScreenerError};

/// Concurrency policy for one fan-out stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Maximum operations in flight (0 = unbounded)
    limit: usize,
}

impl FanOut {
    pub fn unbounded() -> Self {
        Self { limit: 0 }
    }

    /// At most `limit` operations in flight; 0 means unbounded
    pub fn bounded(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every operation and return their outcomes in input order.
    pub async fn collect<T, Fut, I>(&self, operations: I) -> Vec<Result<T>>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T>>,
    {
        let guarded = operations.into_iter().map(isolate);

        let outcomes: Vec<Result<T>> = if self.limit == 0 {
            join_all(guarded).await
        } else {
            // `buffered` preserves input order, unlike `buffer_unordered`
            stream::iter(guarded).buffered(self.limit).collect().await
        };

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        debug!(
            total = outcomes.len(),
            failed,
            limit = self.limit,
            "Fan-out stage finished"
        );
        outcomes
    }

    /// Like [`collect`](Self::collect), keeping a label next to each outcome.
    pub async fn collect_labeled<K, T, Fut, I>(&self, operations: I) -> Vec<(K, Result<T>)>
    where
        I: IntoIterator<Item = (K, Fut)>,
        Fut: Future<Output = Result<T>>,
    {
        let (labels, futures): (Vec<K>, Vec<Fut>) = operations.into_iter().unzip();
        let outcomes = self.collect(futures).await;
        labels.into_iter().zip(outcomes).collect()
    }
}

/// Converts a panic inside `operation` into an ordinary failure outcome
pub(crate) async fn isolate<T, Fut>(operation: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "Fan-out operation panicked");
            Err(ScreenerError::orchestration(format!(
                "operation panicked: {message}"
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
