//! Quote CRUD and status transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{NewQuote, Quote, QuoteStatus, QuoteUpdate};
use crate::validators::{validate_amount_cents, validate_currency, validate_name};
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(remove))
        .route("/{id}/status", post(set_status))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: QuoteStatus,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Quote>>, AppError> {
    authorize(user.role(), Resource::Quote, Action::List)?;
    Ok(Json(state.quotes.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Quote>, AppError> {
    authorize(user.role(), Resource::Quote, Action::Read)?;
    let quote = state
        .quotes
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(quote))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewQuote>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Quote, Action::Create)?;
    validate_name(&body.number)?;
    validate_amount_cents(body.total_cents)?;
    validate_currency(&body.currency)?;

    let company_id = user.tenant_for_create()?;
    state
        .customers
        .find(&user.scope(), body.customer_id)
        .await?
        .ok_or(CrmError::Validation("Unknown customer".to_owned()))?;

    let quote = state.quotes.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "quote", quote.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(quote)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<QuoteUpdate>,
) -> Result<Json<Quote>, AppError> {
    authorize(user.role(), Resource::Quote, Action::Update)?;
    validate_amount_cents(body.total_cents)?;
    validate_currency(&body.currency)?;

    let quote = state.quotes.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "quote", quote.id, None)
        .await;

    Ok(Json(quote))
}

/// POST /api/quotes/{id}/status
async fn set_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Quote>, AppError> {
    authorize(user.role(), Resource::Quote, Action::Transition)?;

    let scope = user.scope();
    let quote = state
        .quotes
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = quote.status.transition(body.status)?;
    let quote = state.quotes.set_status(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "quote",
            quote.id,
            Some(format!("status={}", next.as_str())),
        )
        .await;

    Ok(Json(quote))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Quote, Action::Delete)?;
    state.quotes.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "quote", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Quote deleted".to_owned(),
    }))
}
