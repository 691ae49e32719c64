//! Job registry: the shared, concurrency-safe map of job lifecycles.
//!
//! Entries are created in `Processing` state at submission time and are
//! mutated exactly once, by the worker that owns the job, into a terminal
//! state. All access goes through [`JobRegistry`]; the raw map is never
//! exposed.

mod store;
mod types;

pub use store::{JobRegistry, RegistryError};
pub use types::{DownloadRequest, Job, JobStatus, MediaKind, QualityHint};
