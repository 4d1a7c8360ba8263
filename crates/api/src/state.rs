use std::sync::Arc;

use gsbot_engine::Engine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// `None` when running on the in-memory store.
    pub pool: Option<gsbot_db::DbPool>,
}
