//! Liveness endpoint at `/`

use axum::Json;
use serde::Serialize;

/// Fixed liveness message
pub const ROOT_MESSAGE: &str = "OpenAI Agent backend is up!";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Reports that the relay is up. Does not touch the agent runtime.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE,
    })
}
