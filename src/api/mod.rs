//! HTTP API layer: system endpoints and router composition.

pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Builds the router with all plain HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new().merge(system::routes())
}
