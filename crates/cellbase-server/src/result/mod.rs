//! Uniform result envelope
//!
//! Every backend call produces exactly one [`DataResult`]. The payload is
//! private so `numResults` always equals the number of results carried.

mod iterator;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::EntityKind;

pub use iterator::ResultIterator;

/// Count value meaning "not computed" or "not reliable"
pub const UNKNOWN_COUNT: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Info,
    Warning,
    Error,
}

/// A note attached to an envelope, typically a failure in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub code: String,
    pub message: String,
    /// Position of the triggering input in a batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
}

impl Event {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            code: code.into(),
            message: message.into(),
            index: None,
            field: None,
            entity: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Warning,
            ..Self::error(code, message)
        }
    }

    /// Error event carrying the minimal context of an engine failure
    pub fn from_error(err: &EngineError, entity: EntityKind, index: Option<usize>) -> Self {
        let field = match err {
            EngineError::Build(build) => build.field().map(str::to_string),
            EngineError::Backend(_) => None,
        };
        Self {
            index,
            field,
            entity: Some(entity),
            ..Self::error(err.code(), err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResult<T> {
    id: String,
    /// Elapsed milliseconds
    time: u64,
    events: Vec<Event>,
    num_results: usize,
    results: Vec<T>,
    num_total_results: i64,
    num_matches: i64,
}

impl<T> DataResult<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self {
            id: String::new(),
            time: 0,
            events: Vec::new(),
            num_results: results.len(),
            results,
            num_total_results: UNKNOWN_COUNT,
            num_matches: UNKNOWN_COUNT,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// An envelope with no results and one error event
    pub fn failed(id: impl Into<String>, event: Event) -> Self {
        Self::empty().with_id(id).with_event(event)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_time(mut self, millis: u64) -> Self {
        self.time = millis;
        self
    }

    pub fn with_counts(mut self, total: i64, matches: i64) -> Self {
        self.num_total_results = total;
        self.num_matches = matches;
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn num_total_results(&self) -> i64 {
        self.num_total_results
    }

    pub fn num_matches(&self) -> i64 {
        self.num_matches
    }

    pub fn has_errors(&self) -> bool {
        self.events.iter().any(|e| e.kind == EventKind::Error)
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    /// Replace each result with zero or more derived values, keeping metadata
    ///
    /// `numResults` follows the new payload; the counts of the underlying
    /// query are carried over unchanged.
    pub fn flat_map_results<U, I>(self, f: impl FnMut(T) -> I) -> DataResult<U>
    where
        I: IntoIterator<Item = U>,
    {
        let results: Vec<U> = self.results.into_iter().flat_map(f).collect();
        DataResult {
            id: self.id,
            time: self.time,
            events: self.events,
            num_results: results.len(),
            results,
            num_total_results: self.num_total_results,
            num_matches: self.num_matches,
        }
    }
}

impl<T> Default for DataResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for DataResult<T> {
    fn from(results: Vec<T>) -> Self {
        Self::new(results)
    }
}
