use axum::{Router, routing::get};

use super::handlers::health::healthz;
use crate::presentation::AppState;

pub(crate) mod auth;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(auth::router())
        .merge(posts::router(state.clone()))
        .with_state(state)
}
