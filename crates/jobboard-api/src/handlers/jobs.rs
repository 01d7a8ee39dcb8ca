//! Job posting handlers.
//!
//! Reads are public. Create, update, delete and seeding take the `ApiKey`
//! extractor ahead of the body, so an unauthorized request is rejected
//! before its body is parsed or validated.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use jobboard_models::{
    page_or_default, sample_jobs, size_or_default, Job, JobId, JobPage, PageRequest, SearchFilter,
    DEFAULT_PAGE_SIZE,
};

use crate::auth::ApiKey;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Query parameters for search. Empty strings count as absent.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "page_or_default")]
    pub page: usize,
    #[serde(default = "default_page_size", deserialize_with = "size_or_default")]
    pub size: usize,
}

/// Body of an application.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/jobs`: one page of all jobs.
pub async fn list_jobs(
    State(state): State<AppState>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Json<JobPage>> {
    let page = query_params(query)?;
    let jobs = state.store.list_all().await?;
    Ok(Json(page.slice(jobs)))
}

/// `GET /api/jobs/:id`
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    let id = JobId::from_string(id);
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", id)))
}

/// `POST /api/jobs`: create with a store-assigned id.
pub async fn create_job(
    State(state): State<AppState>,
    _key: ApiKey,
    body: Result<Json<Job>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let job = json_body(body)?;
    job.check()?;

    let created = state.store.insert(Job { id: None, ..job }).await?;
    metrics::record_job_created();
    info!(job_id = created.id_str().unwrap_or_default(), "Job created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/jobs/:id`: replace the whole job; the path id wins.
pub async fn update_job(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(id): Path<String>,
    body: Result<Json<Job>, JsonRejection>,
) -> ApiResult<Json<Job>> {
    let job = json_body(body)?;
    job.check()?;

    let id = JobId::from_string(id);
    let updated = state.store.replace(&id, job.with_id(id.clone())).await?;
    metrics::record_job_updated();
    info!(job_id = %id, "Job replaced");

    Ok(Json(updated))
}

/// `DELETE /api/jobs/:id`: succeeds whether or not the job existed.
pub async fn delete_job(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = JobId::from_string(id);
    state.store.delete(&id).await?;
    metrics::record_job_deleted();
    info!(job_id = %id, "Job deleted");

    Ok(Json(MessageResponse::new("Job deleted successfully")))
}

/// `GET /api/jobs/search`: title prefix, exact location and type, paginated.
pub async fn search_jobs(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<JobPage>> {
    let query = query_params(query)?;
    let filter = SearchFilter::new(query.keyword, query.location, query.job_type);

    let jobs = state.store.search(&filter).await?;
    Ok(Json(PageRequest::new(query.page, query.size).slice(jobs)))
}

/// `POST /api/jobs/:id/apply`: record a user's application once.
pub async fn apply_to_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = json_body(body)?
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userId is required"))?;

    let id = JobId::from_string(id);
    state
        .store
        .add_applicant(&id, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", id)))?;
    metrics::record_application();
    info!(job_id = %id, "Application recorded");

    Ok(Json(MessageResponse::new("Application submitted successfully")))
}

/// `POST /api/jobs/samples`: insert the canned sample postings.
pub async fn seed_sample_jobs(
    State(state): State<AppState>,
    _key: ApiKey,
) -> ApiResult<(StatusCode, Json<JobPage>)> {
    let mut created = Vec::new();
    for job in sample_jobs(Utc::now()) {
        created.push(state.store.insert(job).await?);
        metrics::record_job_created();
    }
    info!(count = created.len(), "Sample jobs added");

    let size = created.len();
    Ok((
        StatusCode::CREATED,
        Json(JobPage {
            total: size,
            jobs: created,
            page: 0,
            size,
        }),
    ))
}
