use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hashlink::app::create_app;
use hashlink::config::{Config, ConfigOverrides};
use hashlink::storage::{MemoryStorage, Storage};

#[derive(Parser)]
#[command(name = "hashlink")]
#[command(about = "In-memory URL shortener with per-redirect analytics", long_about = None)]
struct Cli {
    /// Address to bind (overrides HASHLINK_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides HASHLINK_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Prefix for generated short URLs (overrides HASHLINK_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
}

impl From<Cli> for ConfigOverrides {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            base_url: cli.base_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hashlink=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::load(cli.into())?);
    info!("Loaded configuration");

    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    info!("Using in-memory storage, mappings are lost on shutdown");

    let app = create_app(storage, Arc::clone(&config));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Short URLs are issued as {}/<code>", config.base_url);
    info!(
        "   - Redirects answer with HTTP {}",
        config.redirect_status.status_code().as_u16()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
