//! Inbound connector contract — the envelope the chat connector posts.
//!
//! `POST /v1/inbound` accepts one message per request and blocks until
//! the turn resolves, answering with the disposition so the connector
//! can log what happened.  Replies travel back out of band through the
//! connector's send endpoint, not in this response.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::runtime::{chat_identity, handle_inbound, Disposition};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    /// Raw sender id as the connector saw it, channel suffix included
    /// (e.g. `"628111@s.whatsapp.net"`).
    pub from: String,
    /// The message text. Missing and empty are treated alike.
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct InboundResponse {
    /// Suffix-stripped sender identity.
    pub identity: String,
    pub disposition: Disposition,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/inbound
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn inbound(
    State(state): State<AppState>,
    Json(envelope): Json<InboundEnvelope>,
) -> Json<InboundResponse> {
    let identity = chat_identity(&envelope.from).to_owned();
    let disposition = handle_inbound(&state, &envelope.from, &envelope.body).await;

    Json(InboundResponse {
        identity,
        disposition,
    })
}
