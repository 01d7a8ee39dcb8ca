//! Typed repository for job postings.
//!
//! Jobs live in the top-level `jobs` collection. The document id is the
//! job id; it is not duplicated into the document body.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use jobboard_models::{parse_timestamp, Job, JobId, SearchFilter};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::build_search_query;
use crate::types::{
    ArrayValue, Document, DocumentTransform, FieldTransform, FromFirestoreValue, Precondition,
    ToFirestoreValue, Value, Write,
};

/// Collection holding job documents.
pub const JOBS_COLLECTION: &str = "jobs";

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Every job, in the store's natural (document id) order.
    pub async fn list_all(&self) -> FirestoreResult<Vec<Job>> {
        let docs = self.client.list_all_documents(JOBS_COLLECTION).await?;
        docs.iter().map(document_to_job).collect()
    }

    /// Get a job by ID.
    pub async fn get(&self, id: &JobId) -> FirestoreResult<Option<Job>> {
        match self.client.get_document(JOBS_COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Some(document_to_job(&doc)?)),
            None => Ok(None),
        }
    }

    /// Insert a job under a fresh, store-assigned id.
    ///
    /// Any id already on `job` is ignored.
    pub async fn insert(&self, job: &Job) -> FirestoreResult<Job> {
        let doc = self
            .client
            .create_document(JOBS_COLLECTION, job_to_fields(job))
            .await?;
        let created = document_to_job(&doc)?;
        info!("Created job {}", created.id.as_ref().map(JobId::as_str).unwrap_or("?"));
        Ok(created)
    }

    /// Overwrite the job stored under `id`, creating it if absent.
    pub async fn replace(&self, id: &JobId, job: &Job) -> FirestoreResult<Job> {
        let doc = self
            .client
            .set_document(JOBS_COLLECTION, id.as_str(), job_to_fields(job))
            .await?;
        debug!("Replaced job {}", id);
        Ok(document_to_job(&doc)?.with_id(id.clone()))
    }

    /// Delete a job. Missing jobs are not an error.
    pub async fn delete(&self, id: &JobId) -> FirestoreResult<()> {
        self.client.delete_document(JOBS_COLLECTION, id.as_str()).await
    }

    /// Jobs matching every criterion of `filter`.
    ///
    /// Combining a keyword with location or type needs a composite index
    /// on the `jobs` collection.
    pub async fn search(&self, filter: &SearchFilter) -> FirestoreResult<Vec<Job>> {
        if filter.is_empty() {
            return self.list_all().await;
        }

        let query = build_search_query(JOBS_COLLECTION, filter);
        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_job).collect()
    }

    /// Add `user_id` to a job's applicants; a repeat application is a no-op.
    ///
    /// Returns `None` when the job does not exist.
    pub async fn add_applicant(&self, id: &JobId, user_id: &str) -> FirestoreResult<Option<Job>> {
        let write = Write {
            transform: Some(DocumentTransform {
                document: self.client.full_document_name(JOBS_COLLECTION, id.as_str()),
                field_transforms: vec![FieldTransform {
                    field_path: "applicants".to_string(),
                    append_missing_elements: Some(ArrayValue {
                        values: Some(vec![user_id.to_firestore_value()]),
                    }),
                }],
            }),
            current_document: Some(Precondition { exists: Some(true) }),
        };

        match self.client.commit(vec![write]).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        }

        info!("Recorded application to job {}", id);
        self.get(id).await
    }

    /// Cheap round trip proving the store is reachable and authorized.
    pub async fn ping(&self) -> FirestoreResult<()> {
        self.client.get_document("_health", "_check").await.map(|_| ())
    }
}

/// Encode a job as document fields. The id is carried by the document name.
pub fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("company".to_string(), job.company.to_firestore_value());
    fields.insert("location".to_string(), job.location.to_firestore_value());
    fields.insert("description".to_string(), job.description.to_firestore_value());
    fields.insert("skills".to_string(), job.skills.to_firestore_value());
    fields.insert("applicants".to_string(), job.applicants.to_firestore_value());
    fields.insert("active".to_string(), job.active.to_firestore_value());

    let optional = [
        ("requirements", &job.requirements),
        ("type", &job.job_type),
        ("salary", &job.salary),
        ("experienceLevel", &job.experience_level),
        ("companyId", &job.company_id),
    ];
    for (name, value) in optional {
        if let Some(v) = value {
            fields.insert(name.to_string(), v.to_firestore_value());
        }
    }

    if let Some(posted) = job.posted_date {
        fields.insert("postedDate".to_string(), posted.to_firestore_value());
    }
    if let Some(expiry) = job.expiry_date {
        fields.insert("expiryDate".to_string(), expiry.to_firestore_value());
    }

    fields
}

/// Decode a job document.
///
/// Missing text fields read as empty and missing sets as empty. Dates are
/// accepted either as native timestamps or as ISO-8601 strings.
pub fn document_to_job(doc: &Document) -> FirestoreResult<Job> {
    let id = doc
        .id()
        .ok_or_else(|| FirestoreError::invalid_response("Job document has no name"))?;

    let empty = HashMap::new();
    let fields = doc.fields.as_ref().unwrap_or(&empty);

    let get_string = |key: &str| -> Option<String> {
        fields.get(key).and_then(String::from_firestore_value)
    };

    let get_set = |key: &str| -> BTreeSet<String> {
        fields
            .get(key)
            .and_then(BTreeSet::<String>::from_firestore_value)
            .unwrap_or_default()
    };

    let get_timestamp = |key: &str| -> Option<DateTime<Utc>> {
        match fields.get(key)? {
            Value::StringValue(s) => parse_timestamp(s).ok(),
            other => DateTime::<Utc>::from_firestore_value(other),
        }
    };

    Ok(Job {
        id: Some(JobId::from_string(id)),
        title: get_string("title").unwrap_or_default(),
        company: get_string("company").unwrap_or_default(),
        location: get_string("location").unwrap_or_default(),
        description: get_string("description").unwrap_or_default(),
        requirements: get_string("requirements"),
        job_type: get_string("type"),
        salary: get_string("salary"),
        experience_level: get_string("experienceLevel"),
        skills: get_set("skills"),
        posted_date: get_timestamp("postedDate"),
        expiry_date: get_timestamp("expiryDate"),
        active: fields
            .get("active")
            .and_then(bool::from_firestore_value)
            .unwrap_or(false),
        company_id: get_string("companyId"),
        applicants: get_set("applicants"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_job() -> Job {
        Job {
            id: Some(JobId::from_string("ignored")),
            title: "Backend Developer".to_string(),
            company: "Enterprise Solutions".to_string(),
            location: "Remote".to_string(),
            description: "APIs".to_string(),
            job_type: Some("CONTRACT".to_string()),
            skills: ["Go".to_string(), "SQL".to_string()].into_iter().collect(),
            expiry_date: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn doc_named(id: &str, fields: HashMap<String, Value>) -> Document {
        Document {
            name: Some(format!("projects/p/databases/(default)/documents/jobs/{}", id)),
            ..Document::new(fields)
        }
    }

    #[test]
    fn test_fields_omit_id_and_absent_optionals() {
        let fields = job_to_fields(&sample_job());
        assert!(!fields.contains_key("id"));
        assert!(!fields.contains_key("salary"));
        assert_eq!(fields.get("type"), Some(&Value::StringValue("CONTRACT".into())));
        assert!(matches!(fields.get("expiryDate"), Some(Value::TimestampValue(_))));
    }

    #[test]
    fn test_document_roundtrip_takes_id_from_name() {
        let job = sample_job();
        let decoded = document_to_job(&doc_named("abc", job_to_fields(&job))).unwrap();
        assert_eq!(decoded.id_str(), Some("abc"));
        assert_eq!(decoded.title, job.title);
        assert_eq!(decoded.skills, job.skills);
        assert_eq!(decoded.expiry_date, job.expiry_date);
    }

    #[test]
    fn test_string_dates_are_accepted() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), Value::StringValue("Intern".into()));
        fields.insert(
            "expiryDate".to_string(),
            Value::StringValue("2030-06-01T12:00:00.000Z".into()),
        );
        let job = document_to_job(&doc_named("x", fields)).unwrap();
        assert_eq!(
            job.expiry_date,
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap())
        );
        assert!(job.applicants.is_empty());
        assert_eq!(job.company, "");
    }

    #[test]
    fn test_document_without_name_is_rejected() {
        let err = document_to_job(&Document::new(HashMap::new())).unwrap_err();
        assert!(matches!(err, FirestoreError::InvalidResponse(_)));
    }
}
