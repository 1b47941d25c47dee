use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::protocol::WS_PATH;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod relay;

use app_state::AppState;
use config::load_settings;
use relay::Relay;

const RELAY_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let state = AppState {
        relay: Relay::new(RELAY_CAPACITY, settings.echo_to_sender),
    };
    let app = build_router(Arc::new(state), settings.static_dir.as_deref());

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, echo_to_sender = settings.echo_to_sender, "relay server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("relay server stopped");
    Ok(())
}

fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(WS_PATH, get(ws_handler));
    let router = match static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    debug!(
        clients = relay.connected_clients(),
        "websocket upgrade requested"
    );
    ws.on_upgrade(move |socket| relay.serve_connection(socket))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
