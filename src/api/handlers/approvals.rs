//! Approval requests and decisions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::{ActivityRecorder, DecideApprovalAction};
use crate::api::{AppError, AppState, CurrentUser};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{ApprovalRequest, ApprovalStatus, NewApproval};
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read))
        .route("/{id}/decide", post(decide))
}

#[derive(Debug, Deserialize)]
struct DecisionRequest {
    status: ApprovalStatus,
    note: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ApprovalRequest>>, AppError> {
    authorize(user.role(), Resource::Approval, Action::List)?;
    Ok(Json(state.approvals.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApprovalRequest>, AppError> {
    authorize(user.role(), Resource::Approval, Action::Read)?;
    let approval = state
        .approvals
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(approval))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewApproval>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Approval, Action::Create)?;

    let company_id = user.tenant_for_create()?;
    let approval = state
        .approvals
        .create(company_id, user.user_id(), body)
        .await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "approval", approval.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(approval)))
}

/// POST /api/approvals/{id}/decide
async fn decide(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<ApprovalRequest>, AppError> {
    authorize(user.role(), Resource::Approval, Action::Decide)?;

    let action = DecideApprovalAction::new(state.approvals.clone(), state.notifications.clone());
    let approval = action
        .execute(&user.scope(), id, body.status, user.user_id(), body.note)
        .await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "decide",
            "approval",
            approval.id,
            Some(format!("status={}", approval.status.as_str())),
        )
        .await;

    Ok(Json(approval))
}
