//! Aggregate reports, served through the report cache.
//!
//! Responses carry a `cached` marker and the snapshot timestamp so callers
//! can tell a hit from a recomputation. `?refresh=1` bypasses the TTL.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AppError, AppState, CurrentUser};
use crate::authz::{authorize, Action, Resource};
use crate::report::{customers_report, products_report, sales_report, CachedReport, ReportType};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers))
        .route("/sales", get(sales))
        .route("/products", get(products))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    refresh: Option<String>,
}

impl ReportQuery {
    fn force_refresh(&self) -> bool {
        matches!(self.refresh.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    report: serde_json::Value,
    cached: bool,
    computed_at: DateTime<Utc>,
}

impl From<CachedReport> for ReportResponse {
    fn from(cached: CachedReport) -> Self {
        ReportResponse {
            report: cached.payload,
            cached: cached.cached,
            computed_at: cached.computed_at,
        }
    }
}

/// GET /api/reports/customers
async fn customers(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    authorize(user.role(), Resource::Report, Action::Read)?;

    let scope = user.scope();
    let result = state
        .report_cache
        .fetch(
            ReportType::Customers,
            &scope,
            state.report_ttls.customers_ttl,
            query.force_refresh(),
            || async { customers_report(state.customers.as_ref(), &scope).await },
        )
        .await?;

    Ok(Json(result.into()))
}

/// GET /api/reports/sales
async fn sales(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    authorize(user.role(), Resource::Report, Action::Read)?;

    let scope = user.scope();
    let result = state
        .report_cache
        .fetch(
            ReportType::Sales,
            &scope,
            state.report_ttls.sales_ttl,
            query.force_refresh(),
            || async { sales_report(state.deals.as_ref(), state.invoices.as_ref(), &scope).await },
        )
        .await?;

    Ok(Json(result.into()))
}

/// GET /api/reports/products
async fn products(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    authorize(user.role(), Resource::Report, Action::Read)?;

    let scope = user.scope();
    let result = state
        .report_cache
        .fetch(
            ReportType::Products,
            &scope,
            state.report_ttls.products_ttl,
            query.force_refresh(),
            || async { products_report(state.deals.as_ref(), &scope).await },
        )
        .await?;

    Ok(Json(result.into()))
}
