//! Tenant activity log.

use axum::extract::State;
use axum::Json;

use crate::api::{AppError, AppState, CurrentUser};
use crate::authz::{authorize, Action, Resource};
use crate::repository::ActivityLog;

/// GET /api/activity - audit trail for the caller's tenant, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    authorize(user.role(), Resource::Activity, Action::List)?;
    Ok(Json(state.activity.list(&user.scope()).await?))
}
