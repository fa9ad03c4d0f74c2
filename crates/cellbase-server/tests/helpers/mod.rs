//! Test helpers for CellBase server integration tests
//!
//! This module provides:
//! - An in-memory backend seeded with the fixture collections
//! - Entity managers and a full router built on top of it
//! - A backend wrapper that fails requests touching a chosen value
//! - A request helper returning status and JSON body

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cellbase_server::{
    api::{self, AppState},
    backend::{
        AggregationStage, DocumentBackend, DocumentStream, FindRequest, InMemoryBackend,
        SharedBackend,
    },
    config::{Config, QueryConfig},
    engine::EntityManager,
    models::Entity,
    predicate::Predicate,
    BackendError,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

// Re-export fixtures for convenience
pub use fixtures::*;

pub fn memory_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_collection("gene", genes())
        .with_collection("transcript", transcripts())
        .with_collection("variant", variants())
        .with_collection("ontology", ontology_terms())
}

pub fn shared_backend() -> SharedBackend {
    Arc::new(memory_backend())
}

pub fn manager<E: Entity>() -> EntityManager<E> {
    manager_on(shared_backend())
}

pub fn manager_on<E: Entity>(backend: SharedBackend) -> EntityManager<E> {
    EntityManager::new(backend, Arc::new(QueryConfig::default()))
}

/// Full application router over the fixture collections
pub fn test_app() -> Router {
    test_app_with(shared_backend(), QueryConfig::default())
}

pub fn test_app_with(backend: SharedBackend, query: QueryConfig) -> Router {
    let mut config = Config::default();
    config.query = query.clone();
    api::create_router(AppState::new(backend, query), &config)
}

/// Issue a GET request and decode the JSON body
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Backend that fails every request whose predicate mentions `marker`
///
/// Everything else is served by the wrapped in-memory backend.
pub struct FailingBackend {
    inner: InMemoryBackend,
    marker: String,
}

impl FailingBackend {
    pub fn new(inner: InMemoryBackend, marker: impl Into<String>) -> Self {
        Self {
            inner,
            marker: marker.into(),
        }
    }

    pub fn shared(marker: impl Into<String>) -> SharedBackend {
        Arc::new(Self::new(memory_backend(), marker))
    }

    fn check(&self, predicate: &Predicate) -> Result<(), BackendError> {
        let rendered = serde_json::to_string(predicate).unwrap();
        if rendered.contains(&self.marker) {
            Err(BackendError::io(format!("injected failure for {}", self.marker)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn find(&self, request: FindRequest) -> Result<DocumentStream, BackendError> {
        self.check(&request.predicate)?;
        self.inner.find(request).await
    }

    async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<AggregationStage>,
    ) -> Result<DocumentStream, BackendError> {
        for stage in &stages {
            if let AggregationStage::Match(predicate) = stage {
                self.check(predicate)?;
            }
        }
        self.inner.aggregate(collection, stages).await
    }

    async fn distinct_values(
        &self,
        collection: &str,
        path: &str,
        predicate: &Predicate,
    ) -> Result<Vec<String>, BackendError> {
        self.check(predicate)?;
        self.inner.distinct_values(collection, path, predicate).await
    }

    async fn count(&self, collection: &str, predicate: &Predicate) -> Result<u64, BackendError> {
        self.check(predicate)?;
        self.inner.count(collection, predicate).await
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Err(BackendError::io("backend unavailable"))
    }
}
