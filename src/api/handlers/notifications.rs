//! The caller's notification inbox.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::{AppError, AppState, CurrentUser};
use crate::authz::{authorize, Action, Resource};
use crate::repository::Notification;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/read", post(mark_read))
}

/// GET /api/notifications - the caller's own inbox, newest first.
async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    authorize(user.role(), Resource::Notification, Action::List)?;
    Ok(Json(
        state
            .notifications
            .list_for_user(&user.scope(), user.user_id())
            .await?,
    ))
}

/// POST /api/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, AppError> {
    authorize(user.role(), Resource::Notification, Action::Update)?;
    let notification = state
        .notifications
        .mark_read(&user.scope(), id, user.user_id())
        .await?;
    Ok(Json(notification))
}
