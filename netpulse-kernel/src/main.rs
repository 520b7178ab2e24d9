/**
 * NETPULSE KERNEL - Point d'entrée du serveur NetPulse
 *
 * RÔLE : Orchestration des modules : config, registre, échantillonneur, HTTP.
 * Bootstrap complet avec logging et arrêt propre (Ctrl-C / SIGTERM).
 *
 * ARCHITECTURE : API REST + registre en mémoire + série glissante des clients actifs.
 */

mod config;
mod fleet;
mod health;
mod http;
mod models;
mod registry;
mod sampler;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::load_config;
use crate::fleet::Fleet;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netpulse_kernel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = load_config().await;

    let fleet = Fleet::new(cfg.sampler.retention());
    // échantillonnage périodique dès le lancement
    let sampler_handle = fleet.spawn_sampler(cfg.sampler.interval());
    tracing::info!(
        interval_secs = cfg.sampler.interval().as_secs(),
        retention_secs = cfg.sampler.retention_secs,
        "active clients sampler started"
    );

    let cors = http::build_cors_layer(&cfg.cors)?;
    let app = http::build_router(AppState::new(fleet), cors);

    let addr: SocketAddr = cfg
        .http
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", cfg.http.bind))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    sampler_handle.abort();
    tracing::info!("sampler stopped, shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
