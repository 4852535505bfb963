use std::path::Path;
use std::sync::Arc;

use opstrack::config::Config;
use opstrack::http::{self, AppState};
use opstrack::processor::{ProcessorRegistry, TaskLocks, dispatch};
use opstrack::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    eprintln!("📋 opstrack v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}:{}/api", config.bind_addr, config.port);
    eprintln!("   Database: {}", config.db_path);

    // ── Database ─────────────────────────────────────────────────────
    let db: Arc<dyn Database> =
        Arc::new(LibSqlBackend::new_local(Path::new(&config.db_path)).await?);

    // ── Background execution ─────────────────────────────────────────
    let locks = Arc::new(TaskLocks::new());
    let registry = Arc::new(ProcessorRegistry::with_defaults());
    let (dispatcher, _worker) =
        dispatch::spawn_worker(Arc::clone(&db), Arc::clone(&locks), Arc::clone(&registry));
    eprintln!("   Processors: {} registered\n", registry.count());

    // ── HTTP server ──────────────────────────────────────────────────
    let state = AppState {
        store: db,
        locks,
        registry,
        dispatcher,
    };
    let app = http::api_routes(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "opstrack API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
