//! Job storage seam used by the handlers.
//!
//! `JobRepository` talks to Firestore; `MemoryJobStore` keeps jobs in
//! process and applies the same search semantics in memory.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use jobboard_firestore::{FirestoreError, JobRepository};
use jobboard_models::{Job, JobId, SearchFilter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Firestore(#[from] FirestoreError),
}

/// Persistence operations on job postings.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Every job, in the store's natural order.
    async fn list_all(&self) -> StoreResult<Vec<Job>>;

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Store a new job under a fresh id and return it with that id.
    async fn insert(&self, job: Job) -> StoreResult<Job>;

    /// Overwrite (or create) the job at `id`.
    async fn replace(&self, id: &JobId, job: Job) -> StoreResult<Job>;

    /// Remove the job at `id`; absent ids succeed.
    async fn delete(&self, id: &JobId) -> StoreResult<()>;

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<Job>>;

    /// Add a user to a job's applicants. `None` when the job is absent.
    async fn add_applicant(&self, id: &JobId, user_id: &str) -> StoreResult<Option<Job>>;

    /// Check the backing store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
impl JobStore for JobRepository {
    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        Ok(JobRepository::list_all(self).await?)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(JobRepository::get(self, id).await?)
    }

    async fn insert(&self, job: Job) -> StoreResult<Job> {
        Ok(JobRepository::insert(self, &job).await?)
    }

    async fn replace(&self, id: &JobId, job: Job) -> StoreResult<Job> {
        Ok(JobRepository::replace(self, id, &job).await?)
    }

    async fn delete(&self, id: &JobId) -> StoreResult<()> {
        Ok(JobRepository::delete(self, id).await?)
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<Job>> {
        Ok(JobRepository::search(self, filter).await?)
    }

    async fn add_applicant(&self, id: &JobId, user_id: &str) -> StoreResult<Option<Job>> {
        Ok(JobRepository::add_applicant(self, id, user_id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(JobRepository::ping(self).await?)
    }
}

/// In-process job store ordered by id.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<BTreeMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn insert(&self, job: Job) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        let mut id = JobId::new();
        while jobs.contains_key(&id) {
            id = JobId::new();
        }
        let job = job.with_id(id.clone());
        jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn replace(&self, id: &JobId, job: Job) -> StoreResult<Job> {
        let job = job.with_id(id.clone());
        self.jobs.write().await.insert(id.clone(), job.clone());
        Ok(job)
    }

    async fn delete(&self, id: &JobId) -> StoreResult<()> {
        self.jobs.write().await.remove(id);
        Ok(())
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect())
    }

    async fn add_applicant(&self, id: &JobId, user_id: &str) -> StoreResult<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        Ok(jobs.get_mut(id).map(|job| {
            job.applicants.insert(user_id.to_string());
            job.clone()
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
