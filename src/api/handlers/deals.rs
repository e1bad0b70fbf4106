//! Deal CRUD and pipeline stage transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{Deal, DealStage, DealUpdate, NewDeal};
use crate::validators::{validate_amount_cents, validate_currency, validate_name};
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(remove))
        .route("/{id}/stage", post(set_stage))
}

#[derive(Debug, Deserialize)]
struct StageRequest {
    stage: DealStage,
}

fn validate(title: &str, value_cents: i64, currency: &str) -> Result<(), CrmError> {
    validate_name(title)?;
    validate_amount_cents(value_cents)?;
    validate_currency(currency)
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Deal>>, AppError> {
    authorize(user.role(), Resource::Deal, Action::List)?;
    Ok(Json(state.deals.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Deal>, AppError> {
    authorize(user.role(), Resource::Deal, Action::Read)?;
    let deal = state
        .deals
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(deal))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewDeal>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Deal, Action::Create)?;
    validate(&body.title, body.value_cents, &body.currency)?;

    // The referenced customer must be visible in the caller's scope.
    let company_id = user.tenant_for_create()?;
    state
        .customers
        .find(&user.scope(), body.customer_id)
        .await?
        .ok_or(CrmError::Validation("Unknown customer".to_owned()))?;

    let deal = state.deals.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "deal", deal.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(deal)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<DealUpdate>,
) -> Result<Json<Deal>, AppError> {
    authorize(user.role(), Resource::Deal, Action::Update)?;
    validate(&body.title, body.value_cents, &body.currency)?;

    let deal = state.deals.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "deal", deal.id, None)
        .await;

    Ok(Json(deal))
}

/// POST /api/deals/{id}/stage
async fn set_stage(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StageRequest>,
) -> Result<Json<Deal>, AppError> {
    authorize(user.role(), Resource::Deal, Action::Transition)?;

    let scope = user.scope();
    let deal = state
        .deals
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = deal.stage.transition(body.stage)?;
    let deal = state.deals.set_stage(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "deal",
            deal.id,
            Some(format!("stage={}", next.as_str())),
        )
        .await;

    Ok(Json(deal))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Deal, Action::Delete)?;
    state.deals.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "deal", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Deal deleted".to_owned(),
    }))
}
