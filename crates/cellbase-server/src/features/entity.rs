//! Routes every entity kind exposes
//!
//! - `GET /search` - filtered search
//! - `GET /first` - first document of the collection
//! - `GET /groupby?fields=a,b` - buckets by one or more fields
//! - `GET /aggregationStats?fields=a,b` - per-field bucket counts
//! - `GET /distinct?field=a` - unique values of a field
//! - `GET /model` - queryable fields and their comparators
//! - `GET /:ids/info` - one envelope per comma separated identifier

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

use crate::api::{ApiError, AppState, QueryResponse, RequestContext};
use crate::engine::elapsed_ms;
use crate::models::Entity;
use crate::query::{split_fields, EntityQuery};
use crate::result::DataResult;

pub fn entity_routes<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::<E>))
        .route("/first", get(first::<E>))
        .route("/groupby", get(group_by::<E>))
        .route("/aggregationStats", get(aggregation_stats::<E>))
        .route("/distinct", get(distinct::<E>))
        .route("/model", get(model::<E>))
        .route("/:ids/info", get(info::<E>))
}

pub(crate) fn respond<T: Serialize>(
    ctx: &RequestContext,
    started: Instant,
    responses: Vec<DataResult<T>>,
) -> Response {
    QueryResponse::new(elapsed_ms(started), ctx.params(), responses).into_response()
}

#[tracing::instrument(skip_all, fields(entity = %E::kind()))]
async fn search<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let query: E::Query = ctx.query(E::schema())?;

    let result = state.manager::<E>().search(&query).await?;

    tracing::debug!(count = result.num_results(), "Search completed");
    Ok(respond(&ctx, started, vec![result]))
}

#[tracing::instrument(skip_all, fields(entity = %E::kind()))]
async fn first<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let result = state.manager::<E>().first().await?;
    Ok(respond(&ctx, started, vec![result]))
}

#[tracing::instrument(skip_all, fields(entity = %E::kind()))]
async fn group_by<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let mut ctx = state.context(params);
    let fields = split_fields(&ctx.take("fields").unwrap_or_default());
    let query: E::Query = ctx.query(E::schema())?;

    let result = state.manager::<E>().group_by(&query, &fields).await?;

    tracing::debug!(count = result.num_results(), "groupBy completed");
    Ok(respond(&ctx, started, vec![result]))
}

#[tracing::instrument(skip_all, fields(entity = %E::kind()))]
async fn aggregation_stats<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let mut ctx = state.context(params);
    let fields = ctx.take("fields");
    let mut query: E::Query = ctx.query(E::schema())?;
    if let Some(fields) = fields {
        query.options_mut().facet = split_fields(&fields);
    }

    let result = state.manager::<E>().aggregation_stats(&query).await?;
    Ok(respond(&ctx, started, vec![result]))
}

#[tracing::instrument(skip_all, fields(entity = %E::kind()))]
async fn distinct<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let mut ctx = state.context(params);
    let field = ctx.require("field")?;
    let mut query: E::Query = ctx.query(E::schema())?;
    query.options_mut().facet = vec![field.trim().to_string()];

    let result = state.manager::<E>().distinct(&query).await?;
    Ok(respond(&ctx, started, vec![result]))
}

async fn model<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let started = Instant::now();
    let ctx = state.context(params);
    let fields: Vec<Value> = E::schema()
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "param": field.camel_case_name(),
                "type": field.field_type,
                "comparator": field.field_type.comparator(),
                "groupable": field.groupable,
            })
        })
        .collect();
    let total = i64::try_from(fields.len()).unwrap_or(i64::MAX);
    let result = DataResult::new(fields)
        .with_id(E::kind().as_str())
        .with_counts(total, total);
    respond(&ctx, started, vec![result])
}

#[tracing::instrument(skip_all, fields(entity = %E::kind(), ids = %ids))]
async fn info<E: Entity>(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let template: E::Query = ctx.query(E::schema())?;
    let ids = split_fields(&ids);

    let results = state.manager::<E>().info(&template, ids).await?;

    tracing::debug!(count = results.len(), "Info completed");
    Ok(respond(&ctx, started, results))
}
