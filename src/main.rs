use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wip_exporter::config::AppConfig;
use wip_exporter::github::GitHubClient;
use wip_exporter::refresher::Refresher;
use wip_exporter::{create_app, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wip_exporter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("missing or invalid configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let client = match GitHubClient::new(config.github_token.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("cannot build GitHub client: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(config.clone()));

    // Keeps the gauges fresh; the server below only ever reads them.
    Refresher::new(client, state.sink.clone(), config.clone()).spawn();

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    tracing::info!("serving metrics at {}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("failed to start server");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
