use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use todo_core::auth::AuthUser;
use todo_core::repo::TaskRepository;
use todo_core::task::{NewTask, Task, TaskPatch};
use todo_core::types::TaskFilter;
use uuid::Uuid;

use crate::error::AppError;
use crate::response::{ApiJson, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Task ids are opaque: anything that is not a UUID simply does not exist.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("Task not found"))
}

/// GET /api/v1/tasks: the caller's tasks, newest first.
pub async fn list_tasks(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<Vec<Task>>, AppError> {
    let filter = match query.status.as_deref() {
        Some(s) if !s.trim().is_empty() => s.trim().parse::<TaskFilter>()?,
        _ => TaskFilter::All,
    };
    let tasks = app
        .with_repo(move |repo| repo.list_tasks(who.user_id, filter))
        .await?;
    Ok(ApiResponse::ok("Tasks retrieved successfully", tasks))
}

/// POST /api/v1/tasks: create a task owned by the caller.
pub async fn create_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateTaskBody>,
) -> Result<(StatusCode, ApiResponse<Task>), AppError> {
    let input = NewTask::parse(&body.title, body.description.as_deref())?;
    let task = app
        .with_repo(move |repo| repo.create_task(who.user_id, input))
        .await?;
    tracing::debug!(task_id = %task.id, "task created");
    Ok(ApiResponse::created("Task created successfully", task))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Task>, AppError> {
    let id = parse_task_id(&id)?;
    let task = app
        .with_repo(move |repo| repo.get_task(who.user_id, id))
        .await?;
    Ok(ApiResponse::ok("Task retrieved successfully", task))
}

/// PATCH or PUT /api/v1/tasks/{id}: partial update.
pub async fn update_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> Result<ApiResponse<Task>, AppError> {
    let id = parse_task_id(&id)?;
    let patch = patch.validated()?;
    let task = app
        .with_repo(move |repo| repo.update_task(who.user_id, id, patch))
        .await?;
    Ok(ApiResponse::ok("Task updated successfully", task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Option<()>>, AppError> {
    let id = parse_task_id(&id)?;
    app.with_repo(move |repo| repo.delete_task(who.user_id, id))
        .await?;
    Ok(ApiResponse::ok("Task deleted successfully", None))
}

async fn set_completed(
    app: AppState,
    who: AuthUser,
    raw_id: &str,
    completed: bool,
) -> Result<Task, AppError> {
    let id = parse_task_id(raw_id)?;
    let task = app
        .with_repo(move |repo| {
            repo.update_task(who.user_id, id, TaskPatch::completion(completed))
        })
        .await?;
    Ok(task)
}

/// POST /api/v1/tasks/{id}/complete
pub async fn complete_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Task>, AppError> {
    let task = set_completed(app, who, &id, true).await?;
    Ok(ApiResponse::ok("Task marked as completed", task))
}

/// POST /api/v1/tasks/{id}/incomplete
pub async fn incomplete_task(
    State(app): State<AppState>,
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Task>, AppError> {
    let task = set_completed(app, who, &id, false).await?;
    Ok(ApiResponse::ok("Task marked as incomplete", task))
}
