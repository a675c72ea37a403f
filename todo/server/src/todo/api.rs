use crate::config::Environment;
use crate::todo::{SeaOrmTodoGateway, StorageError, TodoDraft, TodoItem, TodoService};
use crate::web::api::{ApiError, ApiJson, ErrorResponse};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
pub struct TodoState {
    pub db: Arc<sea_orm::DatabaseConnection>,
    pub environment: Environment,
}

impl TodoState {
    fn service(&self) -> TodoService<SeaOrmTodoGateway<'_>> {
        TodoService::new(SeaOrmTodoGateway::new(&self.db))
    }

    fn json<T>(&self, value: T) -> ApiJson<T> {
        ApiJson::new(value, self.environment)
    }

    fn storage_error(&self) -> impl Fn(StorageError) -> ApiError {
        let environment = self.environment;
        move |err| ApiError::storage(err, environment)
    }
}

/// JSON representation of a todo item for API responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemJson {
    /// Unique identifier assigned on creation
    id: i32,
    title: String,
    description: String,
    /// Free-form status label, e.g. "todo"
    status: String,
    /// Free-form priority label, e.g. "low"
    priority: String,
    /// Reference to an external category
    category_id: String,
    due_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoItem> for TodoItemJson {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            status: item.status,
            priority: item.priority,
            category_id: item.category_id,
            due_date: item.due_date,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// JSON payload for creating or replacing a todo item.
///
/// Missing fields take their defaults; timestamps sent by the client are ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoDraftJson {
    /// Must match the path ID when updating, if present
    id: Option<i32>,
    title: String,
    description: String,
    status: String,
    priority: String,
    category_id: String,
    /// Defaults to the time the request is handled
    due_date: Option<DateTime<Utc>>,
}

impl Default for TodoDraftJson {
    fn default() -> Self {
        let draft = TodoDraft::default();
        Self {
            id: None,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            category_id: draft.category_id,
            due_date: draft.due_date,
        }
    }
}

impl From<TodoDraftJson> for TodoDraft {
    fn from(json: TodoDraftJson) -> Self {
        Self {
            title: json.title,
            description: json.description,
            status: json.status,
            priority: json.priority,
            category_id: json.category_id,
            due_date: json.due_date,
        }
    }
}

/// Handler for GET /api/todo - Returns all todo items.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todo",
    responses(
        (status = 200, description = "Successfully retrieved todo items", body = [TodoItemJson]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todo"
)]
pub async fn get_todos_handler(
    State(state): State<Arc<TodoState>>,
) -> Result<ApiJson<Vec<TodoItemJson>>, ApiError> {
    let items = state
        .service()
        .get_all()
        .await
        .map_err(state.storage_error())?;
    let json_items: Vec<TodoItemJson> = items.into_iter().map(TodoItemJson::from).collect();
    Ok(state.json(json_items))
}

/// Handler for GET /api/todo/{id} - Returns a single todo item.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todo/{id}",
    params(("id" = i32, Path, description = "ID of the todo item")),
    responses(
        (status = 200, description = "Todo item found", body = TodoItemJson),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todo"
)]
pub async fn get_todo_handler(
    State(state): State<Arc<TodoState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<ApiJson<TodoItemJson>, ApiError> {
    let Path(id) = path?;
    let item = state
        .service()
        .get_by_id(id)
        .await
        .map_err(state.storage_error())?
        .ok_or(ApiError::NotFound(id))?;
    Ok(state.json(TodoItemJson::from(item)))
}

/// Handler for POST /api/todo - Creates a todo item.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/todo",
    request_body = TodoDraftJson,
    responses(
        (status = 201, description = "Todo item created", body = TodoItemJson,
            headers(("location" = String, description = "URL of the created todo item"))),
        (status = 400, description = "Malformed payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todo"
)]
pub async fn create_todo_handler(
    State(state): State<Arc<TodoState>>,
    payload: Result<Json<TodoDraftJson>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let created = state
        .service()
        .create(payload.into())
        .await
        .map_err(state.storage_error())?;
    let location = format!("/api/todo/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        state.json(TodoItemJson::from(created)),
    ))
}

/// Handler for PUT /api/todo/{id} - Replaces the content of a todo item.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/todo/{id}",
    params(("id" = i32, Path, description = "ID of the todo item")),
    request_body = TodoDraftJson,
    responses(
        (status = 200, description = "Todo item updated", body = TodoItemJson),
        (status = 400, description = "Malformed payload or ID mismatch", body = ErrorResponse),
        (status = 404, description = "Todo item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todo"
)]
pub async fn update_todo_handler(
    State(state): State<Arc<TodoState>>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TodoDraftJson>, JsonRejection>,
) -> Result<ApiJson<TodoItemJson>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    if let Some(body_id) = payload.id {
        if body_id != id {
            return Err(ApiError::IdMismatch {
                path_id: id,
                body_id,
            });
        }
    }

    let updated = state
        .service()
        .update(id, payload.into())
        .await
        .map_err(state.storage_error())?
        .ok_or(ApiError::NotFound(id))?;
    Ok(state.json(TodoItemJson::from(updated)))
}

/// Handler for DELETE /api/todo/{id} - Deletes a todo item.
///
/// Deleting an ID that does not exist also answers 204.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/todo/{id}",
    params(("id" = i32, Path, description = "ID of the todo item")),
    responses(
        (status = 204, description = "Todo item deleted or already absent"),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todo"
)]
pub async fn delete_todo_handler(
    State(state): State<Arc<TodoState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state
        .service()
        .delete(id)
        .await
        .map_err(state.storage_error())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the todo API router.
pub fn create_api_router(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todo", get(get_todos_handler).post(create_todo_handler))
        .route(
            "/todo/{id}",
            get(get_todo_handler)
                .put(update_todo_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}
