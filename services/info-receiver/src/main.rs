mod app;
mod config;
mod handlers;
mod logic;
mod models;
mod sink;
mod state;

use receiver_common::{bind_listener, init_tracing, shutdown_signal};

use crate::config::ReceiverConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let _guards = init_tracing("info-receiver");

    let config = ReceiverConfig::from_env();
    let app = app::build_router(AppState::console());

    let listener = match bind_listener(config.socket_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %config.socket_addr(), error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
}
