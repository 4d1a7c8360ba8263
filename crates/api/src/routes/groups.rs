//! Route definitions for the `/groups` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// POST   /{group_id}/intents          -> submit_intent
/// POST   /{group_id}/confirmations    -> submit_confirmation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{group_id}/intents", post(groups::submit_intent))
        .route("/{group_id}/confirmations", post(groups::submit_confirmation))
}
