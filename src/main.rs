use std::sync::Arc;

use pdfhelper::{
    build_router,
    config::{Config, LogFormat},
    services::PdfExtractTextExtractor,
    AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pdfhelper=debug,tower_http=debug,axum::rejection=trace".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(Config::log_format_from_env());

    let config = Config::from_env()?;

    tracing::info!("Starting PDF Helper");
    tracing::info!("Max upload size: {}MB", config.max_file_size_mb);
    tracing::info!("Extraction timeout: {}s", config.extraction_timeout_seconds);
    tracing::info!("Upload spool directory: {}", config.upload_dir.display());

    let state = AppState::new(&config, Arc::new(PdfExtractTextExtractor));
    let app = build_router(state, &config);

    let addr = config.bind_address();
    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
