//! Vendor CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{NewVendor, Vendor, VendorUpdate};
use crate::validators::{validate_email, validate_name};
use crate::CrmError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(remove))
}

fn validate(name: &str, email: Option<&str>) -> Result<(), CrmError> {
    validate_name(name)?;
    if let Some(email) = email {
        validate_email(email)?;
    }
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Vendor>>, AppError> {
    authorize(user.role(), Resource::Vendor, Action::List)?;
    Ok(Json(state.vendors.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Vendor>, AppError> {
    authorize(user.role(), Resource::Vendor, Action::Read)?;
    let vendor = state
        .vendors
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(vendor))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewVendor>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Vendor, Action::Create)?;
    validate(&body.name, body.email.as_deref())?;

    let company_id = user.tenant_for_create()?;
    let vendor = state.vendors.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "vendor", vendor.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(vendor)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<VendorUpdate>,
) -> Result<Json<Vendor>, AppError> {
    authorize(user.role(), Resource::Vendor, Action::Update)?;
    validate(&body.name, body.email.as_deref())?;

    let vendor = state.vendors.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "vendor", vendor.id, None)
        .await;

    Ok(Json(vendor))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Vendor, Action::Delete)?;
    state.vendors.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "vendor", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Vendor deleted".to_owned(),
    }))
}
