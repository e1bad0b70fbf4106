//! AI-assisted text drafting.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::actions::{ComposeAction, ComposeKind};
use crate::api::{AppError, AppState, CurrentUser};
use crate::authz::{authorize, Action, Resource};

pub fn routes() -> Router<AppState> {
    Router::new().route("/compose", post(compose))
}

#[derive(Debug, Deserialize)]
struct ComposeRequest {
    kind: ComposeKind,
    context: String,
}

#[derive(Debug, Serialize)]
struct ComposeResponse {
    text: String,
}

/// POST /api/assist/compose
async fn compose(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    authorize(user.role(), Resource::Assist, Action::Create)?;

    let action = ComposeAction::new(state.assist.clone());
    let text = action.execute(body.kind, &body.context).await?;

    Ok(Json(ComposeResponse { text }))
}
