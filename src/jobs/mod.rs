//! Job tracking
//!
//! Job records, their lifecycle state machine, and the store that owns them.

mod job;
mod store;

pub use job::{Job, JobId, JobInput, JobStatus};
pub use store::{InMemoryJobStore, JobStore, SharedJobStore};
