use std::sync::Arc;

use ai_caption_generator::{
    init_tracing, openai::OpenAiProvider, router, AppState, Captioner, Config, VisionProvider,
};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    // after dotenv so RUST_LOG from .env applies
    init_tracing("ai_caption_generator=info,tower_http=info");
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded .env");
    }

    let config = Config::from_env().context("invalid configuration")?;

    let provider: Option<Arc<dyn VisionProvider>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiProvider::new(
            reqwest::Client::new(),
            key.clone(),
            config.openai_base_url.clone(),
        ))),
        None => {
            tracing::warn!("OPENAI_API_KEY is not set; caption requests will fail until it is configured");
            None
        }
    };

    let state = AppState {
        captioner: Captioner::new(&config, provider),
    };
    let app = router(state, config.body_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        model = %config.model,
        "caption server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
