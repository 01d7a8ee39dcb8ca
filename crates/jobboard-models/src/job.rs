//! Job posting definitions.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::timestamp;

/// Unique identifier for a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job posting.
///
/// `id` is assigned by the store on insert and is never taken from a
/// request body. `skills` and `applicants` are sets: order carries no
/// meaning and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub company: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub location: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank"))]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,

    /// Free-text category such as `FULL_TIME` or `CONTRACT`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,

    /// Free-text seniority such as `ENTRY` or `SENIOR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: BTreeSet<String>,

    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub posted_date: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<DateTime<Utc>>")]
    #[validate(required)]
    pub expiry_date: Option<DateTime<Utc>>,

    /// Never set by the API; maintained out of band.
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,

    /// Reference to an external company record (not enforced).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub applicants: BTreeSet<String>,
}

impl Job {
    /// Check required fields.
    pub fn check(&self) -> Result<(), JobValidationError> {
        self.validate().map_err(JobValidationError::from)
    }

    /// Return this job carrying the given id.
    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = Some(id);
        self
    }

    /// Borrow the id, if assigned.
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(JobId::as_str)
    }
}

/// `null` reads as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A job failed required-field validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing or blank required fields: {}", .fields.join(", "))]
pub struct JobValidationError {
    /// Offending fields, by their JSON names, sorted.
    pub fields: Vec<String>,
}

impl From<ValidationErrors> for JobValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|name| json_field_name(name))
            .collect();
        fields.sort();
        Self { fields }
    }
}

/// Map a Rust field name to the camelCase name used on the wire.
fn json_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
