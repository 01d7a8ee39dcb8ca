//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "jobboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobboard_http_requests_in_flight";

    // Domain metrics
    pub const JOBS_CREATED_TOTAL: &str = "jobboard_jobs_created_total";
    pub const JOBS_UPDATED_TOTAL: &str = "jobboard_jobs_updated_total";
    pub const JOBS_DELETED_TOTAL: &str = "jobboard_jobs_deleted_total";
    pub const APPLICATIONS_TOTAL: &str = "jobboard_applications_total";
    pub const AUTH_FAILURES_TOTAL: &str = "jobboard_auth_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "jobboard_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_job_created() {
    counter!(names::JOBS_CREATED_TOTAL).increment(1);
}

pub fn record_job_updated() {
    counter!(names::JOBS_UPDATED_TOTAL).increment(1);
}

pub fn record_job_deleted() {
    counter!(names::JOBS_DELETED_TOTAL).increment(1);
}

pub fn record_application() {
    counter!(names::APPLICATIONS_TOTAL).increment(1);
}

pub fn record_auth_failure() {
    counter!(names::AUTH_FAILURES_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

fn job_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^/api/jobs/([^/]+)").ok())
        .as_ref()
}

/// Collapse job ids in a path so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let Some(pattern) = job_id_pattern() else {
        return path.to_string();
    };

    match pattern.captures(path).and_then(|c| c.get(1)) {
        Some(id) if id.as_str() != "search" && id.as_str() != "samples" => {
            format!("/api/jobs/:id{}", &path[id.end()..])
        }
        _ => path.to_string(),
    }
}

/// Holds one in-flight slot; released on drop, including cancellation.
struct InFlightGuard;

impl InFlightGuard {
    fn acquire() -> Self {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let in_flight = InFlightGuard::acquire();
    let response = next.run(request).await;
    drop(in_flight);

    let status = response.status().as_u16();
    if status == 401 {
        record_auth_failure();
    }
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}
