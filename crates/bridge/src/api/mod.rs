pub mod inbound;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the API router.
///
/// `GET /` is the liveness probe the connector's supervisor polls; it
/// carries no state and always answers as long as the process is up.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alive))
        .route("/healthz", get(alive))
        .route("/v1/inbound", post(inbound::inbound))
}

async fn alive() -> &'static str {
    "ThreadBridge is running"
}
