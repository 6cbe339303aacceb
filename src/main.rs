mod config;
mod element;
mod routes;
mod services;
mod state;
mod whiteboard;
mod wire;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("whiteboard=info,tower_http=info")),
        )
        .init();

    let config = config::HubConfig::from_env();
    let port = config.port;
    let state = state::AppState::new(config);

    // Spawn background expiry task.
    let _expiry = services::expiry::spawn_expiry_task(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "whiteboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
