use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tracing::{info, warn};

use server::config::ServerConfig;
use server::{build_router, AppState, START_TIME};
use speech_core::{OpenAiSpeechClient, Synthesizer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    info!("Starting speech synthesis proxy...");

    let config = ServerConfig::from_env();

    let synthesizer: Option<Arc<dyn Synthesizer>> = match config.api_key.clone() {
        Some(key) => Some(Arc::new(OpenAiSpeechClient::with_base_url(
            key,
            config.provider_base_url.clone(),
        ))),
        None => {
            warn!(
                "OPENAI_API_KEY is not set; synthesis requests will fail with a configuration error"
            );
            None
        }
    };

    // Initialize start time for uptime calculation
    let _ = START_TIME.get_or_init(Instant::now);

    info!(
        "Server configuration loaded: port={}, provider={}, static_dir={}",
        config.port, config.provider_base_url, config.static_dir
    );

    let state = AppState::new(synthesizer, config.clone());
    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT."))?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
