use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;

use wayfinder::api::{AppState, create_router};
use wayfinder::config::CONFIG;

#[derive(Debug, Parser)]
#[command(name = "wayfinder", about = "Natural-language place search service")]
struct Args {
    /// Address to bind, overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of static UI assets, overrides STATIC_DIR
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    // Bridge log crate -> tracing (so log::info! etc. work)
    tracing_log::LogTracer::init()?;

    let args = Args::parse();
    let mut config = CONFIG.clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.server.static_dir = static_dir;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let environment = config.server.environment;
    let purge_interval = config.cache.purge_interval;

    let state = AppState::from_config(config)?;
    spawn_housekeeping(state.clone(), purge_interval);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    log::info!("server running on {addr}");
    log::info!("environment: {}", environment.as_str());
    log::info!("health check: http://{addr}/health");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    log::info!("process terminated");
    Ok(())
}

/// Periodically drop expired cache entries and idle rate-limit windows.
fn spawn_housekeeping(state: AppState, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Some(cache) = state.orchestrator.cache() {
                let purged = cache.purge_expired();
                if purged > 0 {
                    log::debug!("purged {purged} expired cache entries");
                }
            }
            state.limiter.purge_stale();
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {:#}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to listen for SIGTERM: {:#}", e);
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
    log::info!("shutdown signal received, shutting down gracefully");
}
