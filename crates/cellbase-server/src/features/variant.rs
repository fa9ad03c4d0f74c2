//! Variant-only routes
//!
//! - `GET /:ids/match` - stored variants matching each given variant
//! - `GET /labels/types` - supported variant types

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use cellbase_common::VariantSpec;
use std::time::Instant;

use super::entity::respond;
use crate::api::{ApiError, AppState};
use crate::engine::variant_type_labels;
use crate::models::{Entity, Variant};
use crate::query::VariantQuery;

pub fn variant_routes() -> Router<AppState> {
    Router::new()
        .route("/:ids/match", get(match_variants))
        .route("/labels/types", get(variant_types))
}

#[tracing::instrument(skip_all, fields(variants = %ids))]
async fn match_variants(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let variants = VariantSpec::parse_list(&ids)?;
    let template: VariantQuery = ctx.query(Variant::schema())?;

    let results = state
        .manager::<Variant>()
        .get_by_variants(&template, variants)
        .await?;

    tracing::debug!(count = results.len(), "Variant match completed");
    Ok(respond(&ctx, started, results))
}

async fn variant_types(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let started = Instant::now();
    let ctx = state.context(params);
    respond(&ctx, started, vec![variant_type_labels()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = variant_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
