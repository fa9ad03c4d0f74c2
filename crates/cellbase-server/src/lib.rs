//! CellBase Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Query translation and result envelopes for genomic annotation data kept in
//! a document store, served over a read-only REST API.
//!
//! # Overview
//!
//! - **Query objects**: typed, validated filters per entity kind
//!   ([`query`]), built programmatically or from REST parameters
//! - **Predicates**: a backend-neutral predicate tree checked against each
//!   entity's field catalog ([`predicate`]), including genomic region
//!   overlap and variant matching
//! - **Backends**: Postgres `JSONB` collections or an in-memory store
//!   behind the [`DocumentBackend`](backend::DocumentBackend) trait
//! - **Results**: every backend call yields one
//!   [`DataResult`](result::DataResult) envelope; lazy cursors are exposed
//!   through [`ResultIterator`](result::ResultIterator)
//! - **Engine**: [`EntityManager`](engine::EntityManager) runs search, info,
//!   region and variant lookups (batched, order preserving) and the
//!   groupBy / aggregationStats / distinct aggregations
//!
//! # Example
//!
//! ```no_run
//! use cellbase_server::{backend::InMemoryBackend, config::QueryConfig};
//! use cellbase_server::{engine::EntityManager, models::Gene, query::GeneQuery};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let backend = Arc::new(InMemoryBackend::from_dir("fixtures").await?);
//! let genes: EntityManager<Gene> = EntityManager::new(backend, Arc::new(QueryConfig::default()));
//! let result = genes.search(&GeneQuery::default()).await?;
//! println!("{} genes", result.num_results());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod predicate;
pub mod query;
pub mod result;

// Re-export commonly used types
pub use error::{BackendError, EngineError, EngineResult, QueryBuildError};
