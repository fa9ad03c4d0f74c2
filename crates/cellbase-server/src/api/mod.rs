//! HTTP surface
//!
//! A thin adapter over the entity managers: handlers turn the query string
//! into a [`RequestContext`], call one manager operation and wrap the
//! envelopes in a [`QueryResponse`].

pub mod context;
pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use crate::backend::SharedBackend;
use crate::config::{Config, QueryConfig};
use crate::engine::EntityManager;
use crate::features;
use crate::middleware;
use crate::models::Entity;

pub use context::RequestContext;
pub use response::{ApiError, ErrorResponse, QueryResponse};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: SharedBackend,
    pub query: Arc<QueryConfig>,
}

impl AppState {
    pub fn new(backend: SharedBackend, query: QueryConfig) -> Self {
        Self {
            backend,
            query: Arc::new(query),
        }
    }

    pub fn manager<E: Entity>(&self) -> EntityManager<E> {
        EntityManager::new(Arc::clone(&self.backend), Arc::clone(&self.query))
    }

    pub fn context(&self, params: Vec<(String, String)>) -> RequestContext {
        RequestContext::new(&self.query, params)
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/api/v1", features::router(state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match state.backend.health_check().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "backend": state.backend.name(),
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!(backend = state.backend.name(), error = %e, "Backend health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
