use std::net::SocketAddr;

use tokio::signal;

use formdesk::config::Config;
use formdesk::db::Persistence;
use formdesk::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    formdesk::logging::init(&config)?;

    tracing::info!("Starting formdesk");

    let persistence = Persistence::connect(config.database_url.as_deref()).await;
    if let Persistence::Unavailable(reason) = &persistence {
        if config.require_database {
            return Err(format!("Database required but unavailable: {reason}").into());
        }
        tracing::warn!("Continuing without persistence; /health will report degraded");
    }

    let store = formdesk::build_store(&config);
    let mailer = formdesk::build_mailer(&config);

    let addr = SocketAddr::new(config.host, config.port);
    let app = formdesk::build_app(AppState::new(config, store, mailer, persistence));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
