//! Offset pagination over fully materialized result lists.

use schemars::JsonSchema;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::Job;

/// Page size used when the client gives none.
pub const DEFAULT_PAGE_SIZE: usize = 10;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// A paging parameter as it arrives: a JSON number or query-string text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParam {
    Number(usize),
    Text(String),
}

fn param_or<'de, D>(deserializer: D, default: usize) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawParam>::deserialize(deserializer)? {
        None => Ok(default),
        Some(RawParam::Number(n)) => Ok(n),
        Some(RawParam::Text(s)) if s.trim().is_empty() => Ok(default),
        Some(RawParam::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid paging parameter: {:?}", s))),
    }
}

/// Serde helper for `page`: empty or null reads as 0.
pub fn page_or_default<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    param_or(deserializer, 0)
}

/// Serde helper for `size`: empty or null reads as [`DEFAULT_PAGE_SIZE`].
pub fn size_or_default<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    param_or(deserializer, DEFAULT_PAGE_SIZE)
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    #[serde(default, deserialize_with = "page_or_default")]
    pub page: usize,
    #[serde(default = "default_page_size", deserialize_with = "size_or_default")]
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Half-open `[from, to)` window into a list of `total` items.
    ///
    /// Always satisfies `from <= to <= total`.
    pub fn bounds(&self, total: usize) -> (usize, usize) {
        let from = self.page.saturating_mul(self.size).min(total);
        let to = from.saturating_add(self.size).min(total);
        (from, to)
    }

    /// Cut one page out of `jobs`, keeping the store's order.
    pub fn slice(&self, jobs: Vec<Job>) -> JobPage {
        let total = jobs.len();
        let (from, to) = self.bounds(total);
        let jobs = jobs.into_iter().skip(from).take(to - from).collect();

        JobPage {
            jobs,
            total,
            page: self.page,
            size: self.size,
        }
    }
}

/// Paginated list/search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    /// Number of matching jobs before slicing.
    pub total: usize,
    pub page: usize,
    pub size: usize,
}
