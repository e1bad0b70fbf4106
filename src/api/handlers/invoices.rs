//! Invoice CRUD and status transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{Invoice, InvoiceStatus, InvoiceUpdate, NewInvoice};
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
    status: InvoiceStatus,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Invoice>>, AppError> {
    authorize(user.role(), Resource::Invoice, Action::List)?;
    Ok(Json(state.invoices.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Invoice>, AppError> {
    authorize(user.role(), Resource::Invoice, Action::Read)?;
    let invoice = state
        .invoices
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(invoice))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewInvoice>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Invoice, Action::Create)?;
    validate_name(&body.number)?;
    validate_amount_cents(body.total_cents)?;
    validate_currency(&body.currency)?;

    let company_id = user.tenant_for_create()?;
    state
        .customers
        .find(&user.scope(), body.customer_id)
        .await?
        .ok_or(CrmError::Validation("Unknown customer".to_owned()))?;

    let invoice = state.invoices.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "invoice", invoice.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<InvoiceUpdate>,
) -> Result<Json<Invoice>, AppError> {
    authorize(user.role(), Resource::Invoice, Action::Update)?;
    validate_amount_cents(body.total_cents)?;
    validate_currency(&body.currency)?;

    let invoice = state.invoices.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "invoice", invoice.id, None)
        .await;

    Ok(Json(invoice))
}

/// POST /api/invoices/{id}/status
async fn set_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Invoice>, AppError> {
    authorize(user.role(), Resource::Invoice, Action::Transition)?;

    let scope = user.scope();
    let invoice = state
        .invoices
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = invoice.status.transition(body.status)?;
    let invoice = state.invoices.set_status(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "invoice",
            invoice.id,
            Some(format!("status={}", next.as_str())),
        )
        .await;

    Ok(Json(invoice))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Invoice, Action::Delete)?;
    state.invoices.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "invoice", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Invoice deleted".to_owned(),
    }))
}
