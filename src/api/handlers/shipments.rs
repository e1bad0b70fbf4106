//! Shipment CRUD and status transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{NewShipment, Shipment, ShipmentStatus, ShipmentUpdate};
use crate::validators::validate_name;
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(remove))
        .route("/{id}/status", post(set_status))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ShipmentStatus,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Shipment>>, AppError> {
    authorize(user.role(), Resource::Shipment, Action::List)?;
    Ok(Json(state.shipments.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Shipment>, AppError> {
    authorize(user.role(), Resource::Shipment, Action::Read)?;
    let shipment = state
        .shipments
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(shipment))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewShipment>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Shipment, Action::Create)?;
    validate_name(&body.carrier)?;

    let company_id = user.tenant_for_create()?;
    state
        .invoices
        .find(&user.scope(), body.invoice_id)
        .await?
        .ok_or(CrmError::Validation("Unknown invoice".to_owned()))?;

    let shipment = state.shipments.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "shipment", shipment.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(shipment)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<ShipmentUpdate>,
) -> Result<Json<Shipment>, AppError> {
    authorize(user.role(), Resource::Shipment, Action::Update)?;
    validate_name(&body.carrier)?;

    let shipment = state.shipments.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "shipment", shipment.id, None)
        .await;

    Ok(Json(shipment))
}

/// POST /api/shipments/{id}/status
async fn set_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Shipment>, AppError> {
    authorize(user.role(), Resource::Shipment, Action::Transition)?;

    let scope = user.scope();
    let shipment = state
        .shipments
        .find(&scope, id)
        .await?
        .ok_or(CrmError::NotFound)?;

    let next = shipment.status.transition(body.status)?;
    let shipment = state.shipments.set_status(&scope, id, next).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(
            user.session(),
            "transition",
            "shipment",
            shipment.id,
            Some(format!("status={}", next.as_str())),
        )
        .await;

    Ok(Json(shipment))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Shipment, Action::Delete)?;
    state.shipments.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "shipment", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Shipment deleted".to_owned(),
    }))
}
