use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::config::Environment;
use crate::todo::StorageError;
use crate::todo::api::TodoState;

/// JSON response for API errors
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Underlying failure, only reported in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
            detail: None,
        }
    }
}

/// Custom error type for JSON API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No todo item has the requested ID.
    #[error("Todo item {0} not found")]
    NotFound(i32),
    /// The payload carries a different ID than the request path.
    #[error("Path ID {path_id} does not match payload ID {body_id}")]
    IdMismatch { path_id: i32, body_id: i32 },
    /// The request body or path could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Represents a storage failure; `verbose` exposes its text to the client.
    #[error("Storage failure: {source}")]
    Storage {
        #[source]
        source: StorageError,
        verbose: bool,
    },
}

impl ApiError {
    pub fn storage(source: StorageError, environment: Environment) -> Self {
        ApiError::Storage {
            source,
            verbose: environment.verbose_errors(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_response) = match &self {
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            ApiError::IdMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("ID_MISMATCH", self.to_string()),
            ),
            ApiError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_REQUEST", self.to_string()),
            ),
            ApiError::Storage { source, verbose } => {
                tracing::error!("Storage failure while handling request: {}", source);
                let mut error_response = ErrorResponse::new(
                    "STORAGE_ERROR",
                    "An unexpected error occurred while processing your request. Please try again later."
                        .to_string(),
                );
                if *verbose {
                    error_response.detail = Some(source.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, error_response)
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// JSON response body that honours the configured output formatting.
#[derive(Debug)]
pub struct ApiJson<T> {
    value: T,
    pretty: bool,
}

impl<T> ApiJson<T> {
    pub fn new(value: T, environment: Environment) -> Self {
        Self {
            value,
            pretty: environment.pretty_json(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        let rendered = if self.pretty {
            serde_json::to_vec_pretty(&self.value)
        } else {
            serde_json::to_vec(&self.value)
        };

        match rendered {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                body,
            )
                .into_response(),
            Err(err) => {
                tracing::error!("Failed to serialize response body: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::todo::api::get_todos_handler,
        crate::todo::api::get_todo_handler,
        crate::todo::api::create_todo_handler,
        crate::todo::api::update_todo_handler,
        crate::todo::api::delete_todo_handler,
    ),
    components(schemas(
        crate::todo::api::TodoItemJson,
        crate::todo::api::TodoDraftJson,
        ErrorResponse
    )),
    tags((name = "Todo", description = "Todo item management"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(todo_state: Arc<TodoState>) -> Router {
    let todo_router = crate::todo::api::create_api_router(todo_state);
    Router::new().nest("/api", todo_router)
}
