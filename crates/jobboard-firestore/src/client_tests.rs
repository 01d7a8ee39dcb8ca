//! Tests for Firestore client configuration and error mapping.

use std::time::Duration;

use serial_test::serial;

use crate::client::FirestoreConfig;
use crate::error::FirestoreError;

fn clear_env() {
    for key in [
        "GCP_PROJECT_ID",
        "FIREBASE_PROJECT_ID",
        "FIRESTORE_DATABASE_ID",
        "FIRESTORE_CONNECT_TIMEOUT_SECS",
        "FIRESTORE_TIMEOUT_SECS",
        "FIRESTORE_EMULATOR_HOST",
    ] {
        std::env::remove_var(key);
    }
}

// =============================================================================
// Error Type Tests
// =============================================================================

#[test]
fn test_error_from_http_status() {
    assert!(matches!(
        FirestoreError::from_http_status(401, "x"),
        FirestoreError::AuthError(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(403, "x"),
        FirestoreError::PermissionDenied(_)
    ));
    assert!(FirestoreError::from_http_status(404, "x").is_not_found());
    assert!(matches!(
        FirestoreError::from_http_status(409, "x"),
        FirestoreError::AlreadyExists(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(429, "x"),
        FirestoreError::RateLimited(_)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(503, "x"),
        FirestoreError::ServerError(503, _)
    ));
    assert!(matches!(
        FirestoreError::from_http_status(400, "x"),
        FirestoreError::RequestFailed(_)
    ));
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(FirestoreError::RateLimited("x".into()).http_status(), Some(429));
    assert_eq!(
        FirestoreError::ServerError(502, "bad gateway".into()).http_status(),
        Some(502)
    );
    assert_eq!(FirestoreError::invalid_response("x").http_status(), None);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
#[serial]
fn test_config_requires_project_id() {
    clear_env();
    assert!(FirestoreConfig::from_env().is_err());

    std::env::set_var("GCP_PROJECT_ID", "");
    assert!(FirestoreConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_config_defaults() {
    clear_env();
    std::env::set_var("FIREBASE_PROJECT_ID", "jobs-project");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.project_id, "jobs-project");
    assert_eq!(config.database_id, "(default)");
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.emulator_host.is_none());
    assert_eq!(
        config.documents_url(),
        "https://firestore.googleapis.com/v1/projects/jobs-project/databases/(default)/documents"
    );
    clear_env();
}

#[test]
#[serial]
fn test_config_overrides_and_emulator() {
    clear_env();
    std::env::set_var("GCP_PROJECT_ID", "p1");
    std::env::set_var("FIREBASE_PROJECT_ID", "ignored");
    std::env::set_var("FIRESTORE_DATABASE_ID", "jobs-db");
    std::env::set_var("FIRESTORE_TIMEOUT_SECS", "12");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "not-a-number");
    std::env::set_var("FIRESTORE_EMULATOR_HOST", "localhost:8080");

    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.project_id, "p1");
    assert_eq!(config.timeout, Duration::from_secs(12));
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(
        config.documents_url(),
        "http://localhost:8080/v1/projects/p1/databases/jobs-db/documents"
    );
    clear_env();
}
