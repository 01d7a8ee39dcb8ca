//! Shared data models for the JobBoard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and their identifiers
//! - Required-field validation
//! - Page slicing for list and search responses
//! - Search filter semantics (title prefix, exact location/type)
//! - Canned sample postings

pub mod job;
pub mod page;
pub mod samples;
pub mod search;
pub mod timestamp;

// Re-export common types
pub use job::{Job, JobId, JobValidationError};
pub use page::{page_or_default, size_or_default, JobPage, PageRequest, DEFAULT_PAGE_SIZE};
pub use samples::sample_jobs;
pub use search::{SearchFilter, PREFIX_SENTINEL};
pub use timestamp::{parse_timestamp, TimestampError};
