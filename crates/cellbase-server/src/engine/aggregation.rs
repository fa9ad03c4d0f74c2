//! groupBy, aggregationStats and distinct
//!
//! All three build their predicate exactly like a search, then hand an
//! aggregation pipeline (or a distinct request) to the backend and return a
//! single envelope.

use futures::TryStreamExt;
use serde_json::{json, Value};
use std::time::Instant;

use super::{elapsed_ms, EntityManager};
use crate::backend::{Accumulator, AggregationStage, SortField, SortOrder};
use crate::error::{EngineResult, QueryBuildError};
use crate::models::Entity;
use crate::query::EntityQuery;
use crate::result::DataResult;

/// Output name of the per-bucket document count
pub const COUNT_FIELD: &str = "count";

impl<E: Entity> EntityManager<E> {
    /// Bucket matching documents by the given fields
    ///
    /// Each bucket carries its key under `_id`, the number of documents in
    /// `count` and the distinct values of the entity's display field. Buckets
    /// are ordered by descending count.
    #[tracing::instrument(skip_all, fields(entity = %E::kind(), group_fields = ?fields))]
    pub async fn group_by(
        &self,
        query: &E::Query,
        fields: &[String],
    ) -> EngineResult<DataResult<Value>> {
        let started = Instant::now();
        let schema = self.schema();
        if !schema.capabilities.groupable {
            return Err(QueryBuildError::unsupported(self.kind(), "groupBy").into());
        }
        if fields.is_empty() {
            return Err(QueryBuildError::EmptyGroupBy.into());
        }
        let keys = fields
            .iter()
            .map(|field| schema.require_groupable(field).map(|spec| spec.path.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        let prepared = self.prepare(query)?;

        let mut stages = vec![
            AggregationStage::Match(prepared.predicate),
            AggregationStage::Group {
                keys,
                accumulators: vec![
                    Accumulator::Count {
                        output: COUNT_FIELD.to_string(),
                    },
                    Accumulator::AddToSet {
                        output: schema.display_field.to_string(),
                        path: schema.display_field.to_string(),
                    },
                ],
            },
            AggregationStage::Sort(vec![SortField {
                path: COUNT_FIELD.to_string(),
                order: SortOrder::Descending,
            }]),
        ];
        stages.extend(prepared.skip.map(AggregationStage::Skip));
        stages.extend(prepared.limit.map(AggregationStage::Limit));

        let buckets: Vec<Value> = self
            .backend()
            .aggregate(schema.collection, stages)
            .await?
            .try_collect()
            .await?;

        tracing::debug!(num_results = buckets.len(), "groupBy completed");
        Ok(DataResult::new(buckets)
            .with_id(fields.join(","))
            .with_time(elapsed_ms(started)))
    }

    /// Per-facet bucket counts
    ///
    /// Every field named in the query's `facet` option is grouped
    /// separately; the envelope holds one `{name, buckets: [{value, count}]}`
    /// document per facet, in facet order.
    #[tracing::instrument(skip_all, fields(entity = %E::kind()))]
    pub async fn aggregation_stats(&self, query: &E::Query) -> EngineResult<DataResult<Value>> {
        let started = Instant::now();
        let schema = self.schema();
        if !schema.capabilities.aggregation_stats {
            return Err(QueryBuildError::unsupported(self.kind(), "aggregationStats").into());
        }
        let facets = &query.options().facet;
        if facets.is_empty() {
            return Err(QueryBuildError::MissingFacet {
                entity: self.kind(),
                operation: "aggregationStats",
            }
            .into());
        }
        let specs = facets
            .iter()
            .map(|facet| schema.require_groupable(facet))
            .collect::<Result<Vec<_>, _>>()?;
        let predicate = self.prepare(query)?.predicate;

        let mut stats = Vec::with_capacity(specs.len());
        for spec in specs {
            let stages = vec![
                AggregationStage::Match(predicate.clone()),
                AggregationStage::Group {
                    keys: vec![spec.path.to_string()],
                    accumulators: vec![Accumulator::Count {
                        output: COUNT_FIELD.to_string(),
                    }],
                },
                AggregationStage::Sort(vec![SortField {
                    path: COUNT_FIELD.to_string(),
                    order: SortOrder::Descending,
                }]),
            ];
            let groups: Vec<Value> = self
                .backend()
                .aggregate(schema.collection, stages)
                .await?
                .try_collect()
                .await?;
            let buckets: Vec<Value> = groups
                .into_iter()
                .map(|group| {
                    json!({
                        "value": group["_id"][spec.path].clone(),
                        "count": group[COUNT_FIELD].clone(),
                    })
                })
                .collect();
            stats.push(json!({"name": spec.name, "buckets": buckets}));
        }

        Ok(DataResult::new(stats)
            .with_id(facets.join(","))
            .with_time(elapsed_ms(started)))
    }

    /// Unique values of the first `facet` field among matching documents
    #[tracing::instrument(skip_all, fields(entity = %E::kind()))]
    pub async fn distinct(&self, query: &E::Query) -> EngineResult<DataResult<String>> {
        let started = Instant::now();
        let schema = self.schema();
        if !schema.capabilities.distinctable {
            return Err(QueryBuildError::unsupported(self.kind(), "distinct").into());
        }
        let facet = query.options().facet.first().ok_or(QueryBuildError::MissingFacet {
            entity: self.kind(),
            operation: "distinct",
        })?;
        let spec = schema.require_field(facet)?;
        let predicate = self.prepare(query)?.predicate;

        let values = self
            .backend()
            .distinct_values(schema.collection, spec.path, &predicate)
            .await?;
        let total = i64::try_from(values.len()).unwrap_or(i64::MAX);

        Ok(DataResult::new(values)
            .with_id(spec.name)
            .with_counts(total, total)
            .with_time(elapsed_ms(started)))
    }
}
