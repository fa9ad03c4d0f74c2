//! Region lookups
//!
//! `GET /:regions/{gene,transcript,variant}` where `:regions` is a comma
//! separated list such as `13:32315474-32400266,17`. One envelope per
//! region, or a single one with `merge=true`.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use cellbase_common::Region;
use std::time::Instant;

use super::entity::respond;
use crate::api::{ApiError, AppState};
use crate::models::{Entity, Gene, Transcript, Variant};

pub fn region_routes() -> Router<AppState> {
    Router::new()
        .route("/:regions/gene", get(by_region::<Gene>))
        .route("/:regions/transcript", get(by_region::<Transcript>))
        .route("/:regions/variant", get(by_region::<Variant>))
}

#[tracing::instrument(skip_all, fields(entity = %E::kind(), regions = %regions))]
async fn by_region<E: Entity>(
    State(state): State<AppState>,
    Path(regions): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let regions = Region::parse_list(&regions)?;
    let template: E::Query = ctx.query(E::schema())?;

    let results = state.manager::<E>().get_by_regions(&template, regions).await?;

    tracing::debug!(count = results.len(), "Region query completed");
    Ok(respond(&ctx, started, results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = region_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
