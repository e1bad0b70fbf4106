//! Customer CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::actions::ActivityRecorder;
use crate::api::{AppError, AppState, CurrentUser, MessageResponse};
use crate::authz::{authorize, Action, Resource};
use crate::repository::{Customer, CustomerUpdate, NewCustomer};
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
) -> Result<Json<Vec<Customer>>, AppError> {
    authorize(user.role(), Resource::Customer, Action::List)?;
    Ok(Json(state.customers.list(&user.scope()).await?))
}

async fn read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    authorize(user.role(), Resource::Customer, Action::Read)?;
    let customer = state
        .customers
        .find(&user.scope(), id)
        .await?
        .ok_or(CrmError::NotFound)?;
    Ok(Json(customer))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewCustomer>,
) -> Result<impl IntoResponse, AppError> {
    authorize(user.role(), Resource::Customer, Action::Create)?;
    validate(&body.name, body.email.as_deref())?;

    let company_id = user.tenant_for_create()?;
    let customer = state.customers.create(company_id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "create", "customer", customer.id, None)
        .await;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<CustomerUpdate>,
) -> Result<Json<Customer>, AppError> {
    authorize(user.role(), Resource::Customer, Action::Update)?;
    validate(&body.name, body.email.as_deref())?;

    let customer = state.customers.update(&user.scope(), id, body).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "update", "customer", customer.id, None)
        .await;

    Ok(Json(customer))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize(user.role(), Resource::Customer, Action::Delete)?;
    state.customers.delete(&user.scope(), id).await?;

    ActivityRecorder::new(state.activity.clone())
        .record(user.session(), "delete", "customer", id, None)
        .await;

    Ok(Json(MessageResponse {
        message: "Customer deleted".to_owned(),
    }))
}
