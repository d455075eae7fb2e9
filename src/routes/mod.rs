//! HTTP routes for the relay
//!
//! This module defines all HTTP endpoints exposed by the relay.

pub mod chat;
pub mod metrics;
pub mod root;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Wide open CORS for local development; tighten before exposing publicly.
    // Credentials rule out `*`, so everything is mirrored back instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(root::root))
        .route("/chat/completions", post(chat::chat_completions))
        .route("/metrics", get(metrics::prometheus_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
