mod config;
mod error;
mod handlers;
mod models;
mod presenter;
mod services;
mod web; // upload page + JSON API

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalysisHandler;
use services::{AnalysisClient, GeminiTransport, InferenceTransport};
use web::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG from .env applies
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting PeixeScan...");

    let config = Config::from_env()?;

    if config.api_key.is_none() {
        log::warn!("⚠️ GEMINI_API_KEY not set, every analysis will fail until it is configured");
    }

    let transport: Arc<dyn InferenceTransport> = Arc::new(
        GeminiTransport::new(&config.api_base_url, config.request_timeout)
            .context("Failed to build HTTP client")?,
    );
    let client = Arc::new(AnalysisClient::new(
        config.api_key.clone(),
        config.model.clone(),
        transport,
    ));
    log::info!("✅ Gemini client initialized with model: {}", config.model);

    let handler = Arc::new(AnalysisHandler::new(client));
    let app = create_router(handler, &config.static_dir, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Server listening on {}", config.bind_addr);

    println!("\n🐟 PeixeScan AI is running!");
    println!("🌐 Open http://{} and upload a fish photo", config.bind_addr);
    println!("🔌 API: POST /api/identify {{\"image\": \"data:image/jpeg;base64,...\"}}");
    println!("\n🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
