//! Per-entity query managers
//!
//! An [`EntityManager`] ties one entity kind's schema to the shared backend
//! and runs the query pipeline: validate, build the predicate, dispatch,
//! wrap the outcome in a [`DataResult`]. Build failures return before the
//! backend is called.
//!
//! Grouping operations live in [`aggregation`]; batch fan-out in [`batch`];
//! gene and transcript sub-resources in [`lookup`].

pub mod aggregation;
pub mod batch;
pub mod lookup;

use cellbase_common::{Region, VariantSpec, VariantType};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::SharedBackend;
use crate::config::QueryConfig;
use crate::error::{EngineResult, QueryBuildError};
use crate::models::{Entity, EntityKind};
use crate::predicate::{EntitySchema, PredicateBuilder, PreparedQuery};
use crate::query::{EntityQuery, QueryOptions};
use crate::result::{DataResult, Event, ResultIterator, UNKNOWN_COUNT};

pub use batch::BatchDispatcher;

/// Id of the variant type label envelope
pub const VARIANT_TYPES_LABEL: &str = "variant_types";

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Query entry point for one entity kind
pub struct EntityManager<E: Entity> {
    backend: SharedBackend,
    config: Arc<QueryConfig>,
    builder: PredicateBuilder,
    batch: BatchDispatcher,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityManager<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: Arc::clone(&self.config),
            builder: self.builder,
            batch: self.batch,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityManager<E> {
    pub fn new(backend: SharedBackend, config: Arc<QueryConfig>) -> Self {
        let batch = BatchDispatcher::new(config.batch_concurrency);
        Self {
            backend,
            config,
            builder: PredicateBuilder::new(E::schema()),
            batch,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        E::schema()
    }

    pub fn kind(&self) -> EntityKind {
        E::kind()
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn prepare(&self, query: &E::Query) -> Result<PreparedQuery, QueryBuildError> {
        self.builder.prepare(query, &self.config)
    }

    /// Lazy cursor over the matching documents
    ///
    /// Only validation happens here; the backend is called on the first pull.
    pub fn iterator(&self, query: &E::Query) -> Result<ResultIterator<E>, QueryBuildError> {
        let prepared = self.prepare(query)?;
        Ok(self.iterator_from(prepared))
    }

    fn iterator_from(&self, prepared: PreparedQuery) -> ResultIterator<E> {
        ResultIterator::new(
            Arc::clone(&self.backend),
            prepared.into_find_request(self.schema().collection),
            self.kind(),
        )
    }

    #[tracing::instrument(skip_all, fields(entity = %E::kind()))]
    pub async fn search(&self, query: &E::Query) -> EngineResult<DataResult<E>> {
        let started = Instant::now();
        let prepared = self.prepare(query)?;
        let counted = prepared.count.then(|| prepared.predicate.clone());

        let results = self.iterator_from(prepared).collect_all().await?;
        let mut result = DataResult::new(results);

        if let Some(predicate) = counted {
            if self.schema().capabilities.reliable_counts {
                let total = self.backend.count(self.schema().collection, &predicate).await?;
                let total = i64::try_from(total).unwrap_or(i64::MAX);
                result = result.with_counts(total, total);
            } else {
                result.push_event(Event::warning(
                    "UNRELIABLE_COUNT",
                    format!("match counts are not available for {}", self.kind()),
                ));
            }
        }

        tracing::debug!(num_results = result.num_results(), "Search completed");
        Ok(result.with_time(elapsed_ms(started)))
    }

    /// First document of the collection
    pub async fn first(&self) -> EngineResult<DataResult<E>> {
        let query = E::Query::default().with_options(QueryOptions::default().with_limit(1));
        self.search(&query).await
    }

    /// Resolve each identifier against the entity's identifier fields
    ///
    /// One envelope per identifier, in input order, with `id` set to the
    /// identifier. Failures become error events on their own envelope.
    #[tracing::instrument(skip_all, fields(entity = %E::kind(), inputs = ids.len()))]
    pub async fn info(
        &self,
        template: &E::Query,
        ids: Vec<String>,
    ) -> EngineResult<Vec<DataResult<E>>> {
        self.prepare(template)?;
        Ok(self
            .batch
            .run(self.kind(), ids, |_, id| {
                let query = template.clone().with_identifier(id);
                async move { self.search(&query).await }
            })
            .await)
    }

    /// Features overlapping one region
    pub async fn get_by_region(
        &self,
        template: &E::Query,
        region: Region,
    ) -> EngineResult<DataResult<E>> {
        let id = region.to_string();
        let query = template.clone().with_regions(vec![region]);
        Ok(self.search(&query).await?.with_id(id))
    }

    /// Features overlapping a list of regions
    ///
    /// With `merge` set all regions are OR-ed into a single query and a
    /// single envelope; otherwise each region gets its own query and
    /// envelope, in input order.
    #[tracing::instrument(skip_all, fields(entity = %E::kind(), inputs = regions.len()))]
    pub async fn get_by_regions(
        &self,
        template: &E::Query,
        regions: Vec<Region>,
    ) -> EngineResult<Vec<DataResult<E>>> {
        self.prepare(template)?;
        if template.options().merge {
            let id = join_ids(&regions);
            let query = template.clone().with_regions(regions);
            let result = self.search(&query).await?.with_id(id);
            return Ok(vec![result]);
        }
        Ok(self
            .batch
            .run(self.kind(), regions, |_, region| {
                let query = template.clone().with_regions(vec![region]);
                async move { self.search(&query).await }
            })
            .await)
    }

    /// Stored variants matching one variant
    pub async fn get_by_variant(
        &self,
        template: &E::Query,
        variant: VariantSpec,
    ) -> EngineResult<DataResult<E>> {
        let id = variant.to_string();
        let query = template.clone().with_variant(variant);
        Ok(self.search(&query).await?.with_id(id))
    }

    #[tracing::instrument(skip_all, fields(entity = %E::kind(), inputs = variants.len()))]
    pub async fn get_by_variants(
        &self,
        template: &E::Query,
        variants: Vec<VariantSpec>,
    ) -> EngineResult<Vec<DataResult<E>>> {
        self.prepare(template)?;
        Ok(self
            .batch
            .run(self.kind(), variants, |_, variant| {
                let query = template.clone().with_variant(variant);
                async move { self.search(&query).await }
            })
            .await)
    }
}

fn join_ids<T: ToString>(inputs: &[T]) -> String {
    inputs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Label envelope listing the supported variant types
pub fn variant_type_labels() -> DataResult<String> {
    let labels = VariantType::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    DataResult::new(labels)
        .with_id(VARIANT_TYPES_LABEL)
        .with_counts(VariantType::ALL.len() as i64, VariantType::ALL.len() as i64)
}
