//! API response types
//!
//! Successful calls wrap their envelopes in a [`QueryResponse`]; failures
//! use the [`ErrorResponse`] shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cellbase_common::CommonError;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BackendError, EngineError, QueryBuildError};
use crate::result::DataResult;

/// Success body: the echoed request parameters and one envelope per input
#[derive(Debug, Serialize)]
pub struct QueryResponse<T> {
    /// Wall time of the whole request in milliseconds
    pub time: u64,
    pub params: BTreeMap<String, String>,
    pub responses: Vec<DataResult<T>>,
}

impl<T: Serialize> QueryResponse<T> {
    pub fn new(time: u64, params: BTreeMap<String, String>, responses: Vec<DataResult<T>>) -> Self {
        Self {
            time,
            params,
            responses,
        }
    }
}

impl<T: Serialize> IntoResponse for QueryResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an error response with details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

/// Handler error converted to an HTTP response
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<QueryBuildError> for ApiError {
    fn from(err: QueryBuildError) -> Self {
        Self(err.into())
    }
}

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        Self(err.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::Build(_) => StatusCode::BAD_REQUEST,
            EngineError::Backend(BackendError::Decode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            EngineError::Build(err) => {
                let details = match err {
                    QueryBuildError::UnknownField { entity, field } => {
                        Some(json!({ "entity": entity, "field": field }))
                    },
                    QueryBuildError::Unsupported { entity, operation } => {
                        Some(json!({ "entity": entity, "operation": operation }))
                    },
                    QueryBuildError::MissingFacet { entity, operation } => {
                        Some(json!({ "entity": entity, "operation": operation }))
                    },
                    other => other.field().map(|field| json!({ "field": field })),
                };
                match details {
                    Some(details) => {
                        ErrorResponse::with_details(self.0.code(), err.to_string(), details)
                    },
                    None => ErrorResponse::new(self.0.code(), err.to_string()),
                }
            },
            EngineError::Backend(err) => {
                tracing::error!(error = %err, "Backend error while serving request");
                ErrorResponse::new(self.0.code(), "The document backend failed to answer")
            },
        };
        (status, Json(body)).into_response()
    }
}
