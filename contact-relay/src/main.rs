//! Contact relay server.
//!
//! This binary:
//! - Loads sender credentials (fatal if missing)
//! - Serves `/contact` for the portfolio front-end
//! - Relays each valid submission to the configured inbox over SMTP
//!
//! Exits with status 1 when credentials are missing or the port cannot be bound.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contact_relay::{router, AppState, Config, SmtpMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("contact_relay_starting");

    // Credentials must resolve before anything binds
    let config = Config::load().context("Failed to load configuration")?;
    info!(
        port = config.port,
        credential_source = %config.source,
        sender = %config.sender_address,
        sender_secret_set = !config.sender_secret.is_empty(),
        receiver = %config.receiver_address,
        smtp_host = %config.smtp_host,
        smtp_port = config.smtp_port,
        "config_loaded"
    );

    let mailer = SmtpMailer::from_config(&config).context("Failed to create SMTP mailer")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, mailer));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not start server on port {}", addr.port()))?;

    let url = format!("http://localhost:{}/contact", addr.port());
    info!(address = %addr, url = %url, "contact_relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("contact_relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("contact_relay_shutting_down");
}
