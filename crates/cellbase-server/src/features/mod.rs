//! REST routes, mounted under `/api/v1`
//!
//! - `/feature/gene`, `/feature/transcript`, `/feature/ontology` - the
//!   shared entity routes in [`entity`], plus the sub-resources in [`gene`]
//! - `/genomic/variant` - entity routes plus variant matching and labels
//! - `/genomic/region` - region lookups for genes, transcripts and variants
//!
//! Handlers are free functions over [`AppState`]; species and assembly are
//! echoed back through the [`RequestContext`](crate::api::RequestContext).

pub mod entity;
pub mod gene;
pub mod region;
pub mod variant;

use axum::Router;

use crate::api::AppState;
use crate::models::{Gene, OntologyTerm, Transcript, Variant};

/// Creates the API router with all feature routes mounted
pub fn router(state: AppState) -> Router<()> {
    Router::new()
        .nest(
            "/feature/gene",
            entity::entity_routes::<Gene>().merge(gene::gene_routes()),
        )
        .nest(
            "/feature/transcript",
            entity::entity_routes::<Transcript>().merge(gene::transcript_routes()),
        )
        .nest("/feature/ontology", entity::entity_routes::<OntologyTerm>())
        .nest(
            "/genomic/variant",
            entity::entity_routes::<Variant>().merge(variant::variant_routes()),
        )
        .nest("/genomic/region", region::region_routes())
        .with_state(state)
}
