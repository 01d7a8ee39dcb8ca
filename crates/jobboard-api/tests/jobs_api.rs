//! Router-level tests against the in-memory job store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use jobboard_api::{create_router, ApiConfig, AppState, JobStore, MemoryJobStore};
use jobboard_models::Job;

const KEY: &str = "test-api-key";

fn app_with_store(api_key: Option<&str>) -> (Router, Arc<MemoryJobStore>) {
    let store = Arc::new(MemoryJobStore::new());
    let config = ApiConfig {
        api_key: api_key.map(str::to_string),
        ..ApiConfig::default()
    };
    let state = AppState::with_store(config, store.clone());
    (create_router(state, None), store)
}

fn app() -> Router {
    app_with_store(Some(KEY)).0
}

fn job_body(title: &str, location: &str, job_type: &str) -> Value {
    json!({
        "title": title,
        "company": "Acme",
        "location": location,
        "description": "Build things",
        "type": job_type,
        "skills": ["Rust"],
        "expiryDate": "2030-01-31"
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> String {
    let (status, created) = send(app, Method::POST, "/api/jobs", Some(KEY), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().unwrap().to_string()
}

fn titles(page: &Value) -> Vec<String> {
    page["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_mutations_require_exact_key() {
    let (app, store) = app_with_store(Some(KEY));
    let body = job_body("Engineer", "Remote", "FULL_TIME");

    let (status, err) = send(&app, Method::POST, "/api/jobs", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(err["detail"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/jobs", Some("wrong"), Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::PUT, "/api/jobs/x", Some("Bearer test-api-key"), Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::DELETE, "/api/jobs/x", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/api/jobs/samples", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_checked_before_body() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/api/jobs", None, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unset_key_rejects_mutations() {
    let (app, _) = app_with_store(None);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(""),
        Some(job_body("Engineer", "Remote", "FULL_TIME")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_validates_required_fields() {
    let app = app();

    let mut body = job_body("   ", "Remote", "FULL_TIME");
    let (status, err) = send(&app, Method::POST, "/api/jobs", Some(KEY), Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["detail"].as_str().unwrap().contains("title"));

    body["title"] = json!("Engineer");
    body.as_object_mut().unwrap().remove("expiryDate");
    let (status, err) = send(&app, Method::POST, "/api/jobs", Some(KEY), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["detail"].as_str().unwrap().contains("expiryDate"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/jobs")
        .header(header::AUTHORIZATION, KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_accepts_null_collections_and_flag() {
    let app = app();
    let mut body = job_body("Engineer", "Remote", "FULL_TIME");
    body["skills"] = Value::Null;
    body["applicants"] = Value::Null;
    body["active"] = Value::Null;

    let (status, created) = send(&app, Method::POST, "/api/jobs", Some(KEY), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["skills"], json!([]));
    assert_eq!(created["applicants"], json!([]));
    assert_eq!(created["active"], false);
}

#[tokio::test]
async fn test_create_assigns_unique_ids_and_ignores_client_id() {
    let app = app();

    let mut body = job_body("Engineer", "Remote", "FULL_TIME");
    body["id"] = json!("client-chosen");
    let first = create(&app, body.clone()).await;
    let second = create(&app, body).await;

    assert!(!first.is_empty());
    assert_ne!(first, "client-chosen");
    assert_ne!(first, second);

    let (status, job) = send(&app, Method::GET, &format!("/api/jobs/{}", first), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["id"], first.as_str());
    assert_eq!(job["expiryDate"], "2030-01-31T00:00:00Z");
    assert_eq!(job["active"], false);
}

#[tokio::test]
async fn test_get_missing_is_404() {
    let (status, err) = send(&app(), Method::GET, "/api/jobs/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err["detail"].is_string());
}

#[tokio::test]
async fn test_update_replaces_whole_document() {
    let app = app();
    let mut body = job_body("Engineer", "Remote", "FULL_TIME");
    body["salary"] = json!("$100k");
    let id = create(&app, body).await;

    let mut replacement = job_body("Senior Engineer", "Berlin", "CONTRACT");
    replacement["id"] = json!("something-else");
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/jobs/{}", id),
        Some(KEY),
        Some(replacement),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());

    let (_, stored) = send(&app, Method::GET, &format!("/api/jobs/{}", id), None, None).await;
    assert_eq!(stored["title"], "Senior Engineer");
    assert!(stored.get("salary").is_none());

    let (_, missing) = send(&app, Method::GET, "/api/jobs/something-else", None, None).await;
    assert!(missing["detail"].is_string());
}

#[tokio::test]
async fn test_update_unknown_id_creates_it() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/jobs/fresh-id",
        Some(KEY),
        Some(job_body("Engineer", "Remote", "FULL_TIME")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, job) = send(&app, Method::GET, "/api/jobs/fresh-id", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["id"], "fresh-id");
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    let id = create(&app, job_body("Engineer", "Remote", "FULL_TIME")).await;
    let uri = format!("/api/jobs/{}", id);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::DELETE, &uri, Some(KEY), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Listing and search
// =============================================================================

#[tokio::test]
async fn test_list_pagination_second_page() {
    let (app, store) = app_with_store(Some(KEY));
    for i in 0..5 {
        create(&app, job_body(&format!("Job {}", i), "Remote", "FULL_TIME")).await;
    }
    let all: Vec<Job> = store.list_all().await.unwrap();

    let (status, page) = send(&app, Method::GET, "/api/jobs?page=1&size=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 1);
    assert_eq!(page["size"], 2);
    assert_eq!(titles(&page), vec![all[2].title.clone(), all[3].title.clone()]);

    let (_, page) = send(&app, Method::GET, "/api/jobs?page=9&size=2", None, None).await;
    assert!(titles(&page).is_empty());
    assert_eq!(page["total"], 5);
}

#[tokio::test]
async fn test_list_defaults_and_bad_params() {
    let app = app();
    let (status, page) = send(&app, Method::GET, "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 0);
    assert_eq!(page["size"], 10);
    assert_eq!(page["total"], 0);

    let (status, _) = send(&app, Method::GET, "/api/jobs?page=-1", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_paging_params_use_defaults() {
    let app = app();
    for i in 0..3 {
        create(&app, job_body(&format!("Job {}", i), "Remote", "FULL_TIME")).await;
    }

    let (status, page) = send(&app, Method::GET, "/api/jobs?page=&size=", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 0);
    assert_eq!(page["size"], 10);
    assert_eq!(page["total"], 3);

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/jobs/search?keyword=&location=&type=&page=&size=",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 0);
    assert_eq!(page["size"], 10);
    assert_eq!(page["total"], 3);
}

async fn seeded_search_app() -> Router {
    let app = app();
    create(&app, job_body("Engineer", "Remote", "FULL_TIME")).await;
    create(&app, job_body("Engineering Manager", "Berlin", "FULL_TIME")).await;
    create(&app, job_body("Senior Engineer", "Remote", "CONTRACT")).await;
    create(&app, job_body("Designer", "Remote (EU)", "CONTRACT")).await;
    app
}

#[tokio::test]
async fn test_search_location_is_exact() {
    let app = seeded_search_app().await;
    let (status, page) = send(&app, Method::GET, "/api/jobs/search?location=Remote", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    for job in page["jobs"].as_array().unwrap() {
        assert_eq!(job["location"], "Remote");
    }
}

#[tokio::test]
async fn test_search_keyword_is_prefix() {
    let app = seeded_search_app().await;
    let (_, page) = send(&app, Method::GET, "/api/jobs/search?keyword=Eng", None, None).await;
    let mut found = titles(&page);
    found.sort();
    assert_eq!(found, vec!["Engineer", "Engineering Manager"]);
}

#[tokio::test]
async fn test_search_combined_and_empty_params() {
    let app = seeded_search_app().await;

    let (_, page) = send(
        &app,
        Method::GET,
        "/api/jobs/search?keyword=Eng&location=Remote&type=FULL_TIME",
        None,
        None,
    )
    .await;
    assert_eq!(titles(&page), vec!["Engineer"]);

    let (_, page) = send(&app, Method::GET, "/api/jobs/search?keyword=&location=&type=", None, None).await;
    assert_eq!(page["total"], 4);

    let (_, page) = send(&app, Method::GET, "/api/jobs/search?type=CONTRACT&size=1", None, None).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["jobs"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Applications and seeding
// =============================================================================

#[tokio::test]
async fn test_apply_deduplicates_applicants() {
    let app = app();
    let id = create(&app, job_body("Engineer", "Remote", "FULL_TIME")).await;
    let uri = format!("/api/jobs/{}/apply", id);

    for _ in 0..2 {
        let (status, body) = send(&app, Method::POST, &uri, None, Some(json!({ "userId": "user-1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }

    let (_, job) = send(&app, Method::GET, &format!("/api/jobs/{}", id), None, None).await;
    assert_eq!(job["applicants"], json!(["user-1"]));
}

#[tokio::test]
async fn test_apply_errors() {
    let app = app();
    let id = create(&app, job_body("Engineer", "Remote", "FULL_TIME")).await;

    let (status, _) = send(&app, Method::POST, &format!("/api/jobs/{}/apply", id), None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/jobs/missing/apply",
        None,
        Some(json!({ "userId": "user-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_seed_sample_jobs() {
    let app = app();
    let (status, page) = send(&app, Method::POST, "/api/jobs/samples", Some(KEY), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(page["total"], 5);

    let (_, page) = send(&app, Method::GET, "/api/jobs/search?location=Remote", None, None).await;
    assert_eq!(titles(&page), vec!["Backend Developer"]);
}

// =============================================================================
// Probes
// =============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"]["status"], "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}
