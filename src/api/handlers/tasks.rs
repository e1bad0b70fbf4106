//! Task CRUD and status transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{NewTask, TaskItem, TaskStatus, TaskUpdate};
use crate::validators::validate_subject;
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(remove))
        .route("/{id}/status", post(set_status))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: TaskStatus,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TaskItem>>, AppError> {
    authorize(user.role(), Resource::Task, Action::List)?;
    Ok(Json(state.tasks.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskItem>, AppError> {
    authorize(user.role(), Resource::Task, Action::Read)?;
    let task = state
        .tasks
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(task))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewTask>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Task, Action::Create)?;
    validate_subject(&body.title)?;

    let company_id = user.tenant_for_create()?;
    let task = state.tasks.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "task", task.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(task)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<TaskUpdate>,
) -> Result<Json<TaskItem>, AppError> {
    authorize(user.role(), Resource::Task, Action::Update)?;
    validate_subject(&body.title)?;

    let task = state.tasks.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "task", task.id, None)
        .await;

    Ok(Json(task))
}

/// POST /api/tasks/{id}/status
async fn set_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<TaskItem>, AppError> {
    authorize(user.role(), Resource::Task, Action::Transition)?;

    let scope = user.scope();
    let task = state
        .tasks
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = task.status.transition(body.status)?;
    let task = state.tasks.set_status(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "task",
            task.id,
            Some(format!("status={}", next.as_str())),
        )
        .await;

    Ok(Json(task))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Task, Action::Delete)?;
    state.tasks.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "task", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Task deleted".to_owned(),
    }))
}
