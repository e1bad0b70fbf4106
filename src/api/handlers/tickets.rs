//! Support ticket CRUD and status transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{NewTicket, Ticket, TicketStatus, TicketUpdate};
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
    status: TicketStatus,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Ticket>>, AppError> {
    authorize(user.role(), Resource::Ticket, Action::List)?;
    Ok(Json(state.tickets.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Ticket>, AppError> {
    authorize(user.role(), Resource::Ticket, Action::Read)?;
    let ticket = state
        .tickets
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(ticket))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewTicket>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Ticket, Action::Create)?;
    validate_subject(&body.subject)?;

    let company_id = user.tenant_for_create()?;
    state
        .customers
        .find(&user.scope(), body.customer_id)
        .await?
        .ok_or(CrmError::Validation("Unknown customer".to_owned()))?;

    let ticket = state.tickets.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "ticket", ticket.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<TicketUpdate>,
) -> Result<Json<Ticket>, AppError> {
    authorize(user.role(), Resource::Ticket, Action::Update)?;
    validate_subject(&body.subject)?;

    let ticket = state.tickets.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "ticket", ticket.id, None)
        .await;

    Ok(Json(ticket))
}

/// POST /api/tickets/{id}/status
async fn set_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Ticket>, AppError> {
    authorize(user.role(), Resource::Ticket, Action::Transition)?;

    let scope = user.scope();
    let ticket = state
        .tickets
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = ticket.status.transition(body.status)?;
    let ticket = state.tickets.set_status(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "ticket",
            ticket.id,
            Some(format!("status={}", next.as_str())),
        )
        .await;

    Ok(Json(ticket))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Ticket, Action::Delete)?;
    state.tickets.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "ticket", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Ticket deleted".to_owned(),
    }))
}
