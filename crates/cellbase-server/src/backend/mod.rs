//! Document store abstraction
//!
//! The engine never talks to a database directly. It hands a
//! [`FindRequest`] or a list of [`AggregationStage`]s to a
//! [`DocumentBackend`] and consumes the returned [`DocumentStream`].
//!
//! Two implementations exist:
//!
//! - [`PgDocumentBackend`]: Postgres `JSONB` collections queried through
//!   `sqlx`, streaming rows through a bounded channel
//! - [`InMemoryBackend`]: documents held in memory with the predicate
//!   evaluated in process, used by tests and local development

pub mod document;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{BackendKind, Config};
use crate::error::BackendError;
use crate::predicate::Predicate;

pub use memory::InMemoryBackend;
pub use postgres::PgDocumentBackend;

/// A stored document
pub type Document = serde_json::Value;

/// Forward-only cursor over backend documents; dropping it releases the cursor
pub type DocumentStream = BoxStream<'static, Result<Document, BackendError>>;

/// Backend handle shared by every request
pub type SharedBackend = Arc<dyn DocumentBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "-1" => Ok(SortOrder::Descending),
            _ => Err(format!("'{s}' is not a sort order")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortField {
    pub path: String,
    pub order: SortOrder,
}

/// Include/exclude document paths
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Everything a backend needs for one `find`
#[derive(Debug, Clone, Serialize)]
pub struct FindRequest {
    pub collection: String,
    pub predicate: Predicate,
    pub projection: Projection,
    pub sort: Vec<SortField>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl FindRequest {
    pub fn new(collection: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            collection: collection.into(),
            predicate,
            projection: Projection::default(),
            sort: Vec::new(),
            skip: None,
            limit: None,
        }
    }
}

/// Per-bucket reducer in a group stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Accumulator {
    /// Number of documents in the bucket
    Count { output: String },
    /// Distinct values of `path` across the bucket
    AddToSet { output: String, path: String },
}

/// One step of an aggregation pipeline
///
/// A group stage emits documents shaped `{"_id": {<key>: <value>, ...},
/// <accumulator outputs>...}`; later stages address those fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AggregationStage {
    Match(Predicate),
    Group {
        keys: Vec<String>,
        accumulators: Vec<Accumulator>,
    },
    Sort(Vec<SortField>),
    Skip(u64),
    Limit(u64),
}

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Open a cursor over matching documents
    async fn find(&self, request: FindRequest) -> Result<DocumentStream, BackendError>;

    /// Run an aggregation pipeline over a collection
    async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<AggregationStage>,
    ) -> Result<DocumentStream, BackendError>;

    /// Unique values of `path` among matching documents, sorted
    async fn distinct_values(
        &self,
        collection: &str,
        path: &str,
        predicate: &Predicate,
    ) -> Result<Vec<String>, BackendError>;

    /// Number of matching documents
    async fn count(&self, collection: &str, predicate: &Predicate) -> Result<u64, BackendError>;

    async fn health_check(&self) -> Result<(), BackendError>;
}

/// Builds the process-wide backend from configuration
pub struct BackendFactory;

impl BackendFactory {
    pub async fn from_config(config: &Config) -> anyhow::Result<SharedBackend> {
        match config.backend.kind {
            BackendKind::Postgres => {
                let backend = PgDocumentBackend::connect(&config.database).await?;
                backend.run_migrations().await?;
                tracing::info!(backend = "postgres", "Document backend ready");
                Ok(Arc::new(backend))
            },
            BackendKind::Memory => {
                let backend = match &config.backend.fixtures_dir {
                    Some(dir) => InMemoryBackend::from_dir(dir).await?,
                    None => InMemoryBackend::new(),
                };
                tracing::info!(
                    backend = "memory",
                    collections = backend.collection_names().len(),
                    "Document backend ready"
                );
                Ok(Arc::new(backend))
            },
        }
    }
}
