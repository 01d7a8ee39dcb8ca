//! Firestore REST API client.
//!
//! This crate provides:
//! - A thin REST client (get, list, create, set, delete, runQuery, commit)
//! - Service account authentication via gcp_auth, or the local emulator
//! - The typed `JobRepository` over the `jobs` collection
//! - Structured-query building for job search

pub mod client;
pub mod error;
pub mod jobs_repo;
pub mod metrics;
pub mod query;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use jobs_repo::{JobRepository, JOBS_COLLECTION};
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
