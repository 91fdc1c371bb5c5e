mod api;
mod middleware;
mod session;

use std::sync::Arc;

use shopdesk_core::AdminCredentials;
use shopdesk_store::StoreClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
    session::SessionKeys,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shopdesk_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(StoreClient::new(&config.store)?);
    let state = AppState {
        store,
        sessions: Arc::new(SessionKeys::new(
            config.session_secret.as_bytes(),
            config.session_ttl_secs,
        )),
        credentials: Arc::new(AdminCredentials::from_config(&config)),
    };
    let app = build_app(state, RateLimitState::per_minute(config.rate_limit_per_minute));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        dataset = %config.store.dataset,
        "shopdesk server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
