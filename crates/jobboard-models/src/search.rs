//! Job search filter.
//!
//! Keyword search is a title *prefix* match emulated as a range
//! `[keyword, keyword + U+F8FF)`, the same shape a Firestore range query
//! takes. Location and type are exact, case-sensitive matches.

use crate::Job;

/// High private-use code point appended to a keyword to form the exclusive
/// upper bound of a prefix range.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Optional search criteria, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl SearchFilter {
    /// Build a filter; empty strings count as absent.
    pub fn new(
        keyword: Option<String>,
        location: Option<String>,
        job_type: Option<String>,
    ) -> Self {
        Self {
            keyword: non_empty(keyword),
            location: non_empty(location),
            job_type: non_empty(job_type),
        }
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none() && self.location.is_none() && self.job_type.is_none()
    }

    /// Inclusive lower and exclusive upper title bound for the keyword.
    pub fn title_range(&self) -> Option<(String, String)> {
        self.keyword.as_ref().map(|k| {
            let mut upper = k.clone();
            upper.push(PREFIX_SENTINEL);
            (k.clone(), upper)
        })
    }

    /// Evaluate the filter against a job in memory.
    ///
    /// String comparison is by code point, which matches the store's
    /// UTF-8 byte ordering.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some((lower, upper)) = self.title_range() {
            let title = job.title.as_str();
            if title < lower.as_str() || title >= upper.as_str() {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if &job.location != location {
                return false;
            }
        }

        if let Some(job_type) = &self.job_type {
            if job.job_type.as_ref() != Some(job_type) {
                return false;
            }
        }

        true
    }
}
