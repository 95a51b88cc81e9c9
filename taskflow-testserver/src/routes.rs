//! HTTP surface of the test server.
//!
//! Mirrors the production wire contract: bearer auth, JSON bodies, and
//! `{"detail": ...}` error payloads. The path user id must match the
//! authenticated user; a mismatch is a 403, an unknown or missing
//! token a 401.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Json;

use taskflow_proto::auth::{AuthResponse, ErrorBody, LoginRequest, RegisterRequest, User};
use taskflow_proto::task::{
    CompletionUpdate, Task, TaskCreate, TaskId, TaskUpdate, UserId, MAX_TITLE_LENGTH,
};

use crate::state::ServerState;

/// A JSON error response with the contract's `detail` shape.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Not authorized for this user")
    }

    fn task_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Task not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

/// Build the full route table over shared state.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/{user_id}/tasks", get(list_tasks).post(create_task))
        .route(
            "/{user_id}/tasks/{task_id}",
            put(update_task).delete(delete_task),
        )
        .route(
            "/{user_id}/tasks/{task_id}/complete",
            axum::routing::patch(set_completion),
        )
        .with_state(state)
}

/// Resolve the bearer token in the request headers to a user.
async fn authenticate(state: &ServerState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(ApiError::unauthorized)?;
    state
        .resolve_token(token)
        .await
        .ok_or_else(ApiError::unauthorized)
}

/// Authenticate and check that the path user id matches the token.
async fn authorize(
    state: &ServerState,
    headers: &HeaderMap,
    user_id: UserId,
) -> Result<User, ApiError> {
    let user = authenticate(state, headers).await?;
    if user.id != user_id {
        return Err(ApiError::forbidden());
    }
    Ok(user)
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title must not be empty",
        ));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title too long",
        ));
    }
    Ok(())
}

async fn register(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .register(&body.email, &body.password, body.name)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Email already registered"))?;
    let access_token = state.issue_token(user.id).await;
    tracing::info!(user_id = user.id, "account registered");
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

async fn login(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .authenticate(&body.email, &body.password)
        .await
        .ok_or_else(|| {
            ApiError::new(StatusCode::UNAUTHORIZED, "Incorrect email or password")
        })?;
    let access_token = state.issue_token(user.id).await;
    tracing::info!(user_id = user.id, "login");
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

async fn me(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(user))
}

async fn list_tasks(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, ApiError> {
    authorize(&state, &headers, user_id).await?;
    Ok(Json(state.list_tasks(user_id).await))
}

async fn create_task(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
    Json(fields): Json<TaskCreate>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    authorize(&state, &headers, user_id).await?;
    validate_title(&fields.title)?;
    let task = state.create_task(user_id, fields).await;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<ServerState>>,
    Path((user_id, task_id)): Path<(UserId, TaskId)>,
    headers: HeaderMap,
    Json(fields): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    authorize(&state, &headers, user_id).await?;
    if let Some(title) = &fields.title {
        validate_title(title)?;
    }
    let task = state
        .update_task(user_id, task_id, fields)
        .await
        .ok_or_else(ApiError::task_not_found)?;
    Ok(Json(task))
}

async fn set_completion(
    State(state): State<Arc<ServerState>>,
    Path((user_id, task_id)): Path<(UserId, TaskId)>,
    headers: HeaderMap,
    Json(body): Json<CompletionUpdate>,
) -> Result<Json<Task>, ApiError> {
    authorize(&state, &headers, user_id).await?;
    let task = state
        .set_completion(user_id, task_id, body.completed)
        .await
        .ok_or_else(ApiError::task_not_found)?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<ServerState>>,
    Path((user_id, task_id)): Path<(UserId, TaskId)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers, user_id).await?;
    if state.delete_task(user_id, task_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::task_not_found())
    }
}
