use mood_journal::{AppState, Config, JsonFileStore, RecordStore, router, snapshot::AnalysisBackend};
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let persistence = Arc::new(JsonFileStore::new(config.data_path.clone()));
    let records = RecordStore::open(persistence).await?;

    let backend = Arc::new(AnalysisBackend::new(
        config.backend_url.clone(),
        config.fetch_timeout,
    )?);
    let state = AppState::new(records, backend.clone(), backend);
    let app = router(state);

    let addr = config.listen_addr();
    info!(backend = %config.backend_url, data = %config.data_path.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
