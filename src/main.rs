//! Chartering back-office service

use shipman::{
    config::AppConfig,
    database::Database,
    errors::ShipmanError,
    server::{create_app, AppState},
};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), ShipmanError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    #[cfg(feature = "dotenvy")]
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(db.clone(), config.http.request_timeout, shutdown.clone());
    let app = create_app(state);

    let listener = TcpListener::bind(config.http.address.as_str()).await.map_err(|e| {
        error!("Failed to bind to {}: {}", config.http.address, e);
        e
    })?;
    info!("HTTP server listening on {}", config.http.address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await;

    info!("Closing connection pool");
    db.close().await;

    served.map_err(ShipmanError::from)
}

/// Resolves on SIGINT or SIGTERM and cancels in-flight store calls
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
    shutdown.cancel();
}
