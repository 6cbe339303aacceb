//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the lobby's JSON endpoints and the three pub/sub
//! transports (websocket, long-polling, streaming) under a single Axum
//! router. Every pub/sub route is addressed as `/pubsub/{whiteboard}/{sender}`.

pub mod pubsub;
pub mod whiteboards;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/whiteboards", post(whiteboards::create))
        .route("/api/whiteboards/{id}", get(whiteboards::display))
        .route("/api/whiteboards/{id}/join", post(whiteboards::join))
        .route("/api/whiteboards/{id}/elements", get(whiteboards::elements))
        .route("/pubsub/{topic}/{sender}", get(pubsub::long_poll).post(pubsub::publish))
        .route("/pubsub/{topic}/{sender}/stream", get(pubsub::stream))
        .route("/pubsub/{topic}/{sender}/ws", get(pubsub::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
