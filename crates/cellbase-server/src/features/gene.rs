//! Gene and transcript sub-resources
//!
//! - `GET /feature/gene/:ids/transcript` - transcripts of each gene
//! - `GET /feature/gene/:ids/tfbs` - binding sites of each gene's transcripts
//! - `GET /feature/transcript/:ids/sequence` - cDNA of each transcript

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::time::Instant;

use super::entity::respond;
use crate::api::{ApiError, AppState};
use crate::models::{Entity, Gene, Transcript};
use crate::query::{split_fields, GeneQuery, TranscriptQuery};

pub fn gene_routes() -> Router<AppState> {
    Router::new()
        .route("/:ids/transcript", get(transcripts_of_genes))
        .route("/:ids/tfbs", get(tfbs_of_genes))
}

pub fn transcript_routes() -> Router<AppState> {
    Router::new().route("/:ids/sequence", get(transcript_sequences))
}

#[tracing::instrument(skip_all, fields(genes = %ids))]
async fn transcripts_of_genes(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let template: TranscriptQuery = ctx.query(Transcript::schema())?;

    let results = state
        .manager::<Transcript>()
        .info(&template, split_fields(&ids))
        .await?;
    Ok(respond(&ctx, started, results))
}

#[tracing::instrument(skip_all, fields(genes = %ids))]
async fn tfbs_of_genes(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);
    let template: GeneQuery = ctx.query(Gene::schema())?;

    let results = state.manager::<Gene>().tfbs(&template, split_fields(&ids)).await?;
    Ok(respond(&ctx, started, results))
}

#[tracing::instrument(skip_all, fields(transcripts = %ids))]
async fn transcript_sequences(
    State(state): State<AppState>,
    Path(ids): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let ctx = state.context(params);

    let results = state
        .manager::<Gene>()
        .transcript_sequences(split_fields(&ids))
        .await?;

    tracing::debug!(count = results.len(), "Sequence lookup completed");
    Ok(respond(&ctx, started, results))
}
