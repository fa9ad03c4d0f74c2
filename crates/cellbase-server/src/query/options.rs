//! Paging, projection and sort controls shared by every query object

use serde::Serialize;

use crate::backend::SortOrder;
use crate::error::QueryBuildError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// `None` when unset or when a non-positive value was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facet: Vec<String>,
    pub count: bool,
    pub merge: bool,
}

impl QueryOptions {
    pub const KEYS: &'static [&'static str] = &[
        "include", "exclude", "limit", "skip", "sort", "order", "facet", "count", "merge",
    ];

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit).filter(|l| *l > 0);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip).filter(|s| *s > 0);
        self
    }

    /// Apply one textual option; returns `false` when `key` is not an option
    pub fn apply(&mut self, key: &str, raw: &str) -> Result<bool, QueryBuildError> {
        match key {
            "include" => self.include = split_fields(raw),
            "exclude" => self.exclude = split_fields(raw),
            "limit" => self.limit = positive(key, raw)?,
            "skip" => self.skip = positive(key, raw)?,
            "sort" => self.sort = split_fields(raw),
            "order" => {
                self.order = raw
                    .parse()
                    .map_err(|reason: String| QueryBuildError::invalid_parameter(key, reason))?
            },
            "facet" => self.facet = split_fields(raw),
            "count" => self.count = boolean(key, raw)?,
            "merge" => self.merge = boolean(key, raw)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub(crate) fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zero and negative values mean "not applied"
fn positive(key: &str, raw: &str) -> Result<Option<u64>, QueryBuildError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| QueryBuildError::invalid_parameter(key, format!("'{raw}' is not an integer")))?;
    Ok(u64::try_from(value).ok().filter(|v| *v > 0))
}

pub(crate) fn boolean(key: &str, raw: &str) -> Result<bool, QueryBuildError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(QueryBuildError::invalid_parameter(key, format!("'{raw}' is not a boolean"))),
    }
}
