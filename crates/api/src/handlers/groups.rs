//! Handlers for the `/groups` resource.
//!
//! The caller is trusted to have resolved the actor's identity and officer
//! role before calling; the body carries both.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use gsbot_core::policy::Actor;
use gsbot_core::types::Snowflake;
use gsbot_engine::{Delivery, Intent, Operation, Outcome};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for submitting an intent.
#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub actor: Actor,
    /// Display-name fragment; omitted or empty targets the actor's own
    /// character.
    #[serde(default)]
    pub target: String,
    pub operation: Operation,
}

/// Request body for replying to a pending purge.
#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    pub actor_id: Snowflake,
    pub text: String,
}

/// POST /api/v1/groups/{group_id}/intents
///
/// Runs the intent to completion. A `delete_all` intent holds the request
/// open until the purge is confirmed, cancelled or times out.
pub async fn submit_intent(
    State(state): State<AppState>,
    Path(group_id): Path<Snowflake>,
    Json(input): Json<IntentRequest>,
) -> AppResult<Json<DataResponse<Outcome>>> {
    let intent = Intent::new(input.actor, group_id, input.target, input.operation, Utc::now());
    let outcome = state.engine.handle(intent).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/groups/{group_id}/confirmations
///
/// Forwards a reply to the purge awaiting confirmation in the group.
/// Returns 404 if nothing is waiting.
pub async fn submit_confirmation(
    State(state): State<AppState>,
    Path(group_id): Path<Snowflake>,
    Json(input): Json<ConfirmationRequest>,
) -> AppResult<Json<DataResponse<Delivery>>> {
    if input.text.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }
    match state
        .engine
        .deliver_confirmation(group_id, input.actor_id, &input.text)
        .await
    {
        Delivery::Delivered => Ok(Json(DataResponse {
            data: Delivery::Delivered,
        })),
        Delivery::NoPendingConfirmation => Err(AppError::NoPendingConfirmation { group_id }),
    }
}
