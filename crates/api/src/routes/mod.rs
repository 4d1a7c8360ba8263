pub mod groups;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /groups/{group_id}/intents          submit an intent (POST)
/// /groups/{group_id}/confirmations    reply to a pending purge (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/groups", groups::router())
}
