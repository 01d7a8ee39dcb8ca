//! Axum HTTP API server for job postings.
//!
//! This crate provides:
//! - CRUD, search and apply endpoints under `/api/jobs`
//! - Shared-secret authorization on mutating routes
//! - A `JobStore` seam with Firestore and in-memory implementations
//! - Rate limiting, request logging and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{ApiConfig, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{JobStore, MemoryJobStore, StoreError};
