use std::{fs, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use server::config::ServerConfig;
use server::pipeline::Pipeline;
use server::{build_router, AppState};
use tts_core::{AudioPlayer, CommandPlayback, GoogleTtsClient};
use vision_core::GeminiClient;

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!("Configuration loaded: {:?}", config);

    fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    // The capability clients use blocking HTTP, so they are built before the
    // async runtime exists.
    let vision = GeminiClient::new(&config.gemini_api_key, &config.gemini_model)
        .context("Error setting Gemini (verify API key)")?;
    let speech = GoogleTtsClient::from_credentials_file(&config.credentials_path, config.voice())
        .context("Error setting Google TTS (verify JSON file)")?;
    info!(
        "Captioning with {}, speaking with {} ({})",
        vision.model(),
        speech.voice().name,
        speech.voice().language_code
    );
    let player = AudioPlayer::new(
        Box::new(CommandPlayback::quiet(&config.audio_player)),
        config.audio_temp_dir.clone(),
    );

    let pipeline = Pipeline::new(
        Arc::new(vision),
        Arc::new(speech),
        player,
        config.upload_dir.clone(),
    );
    let state = AppState {
        pipeline: Arc::new(pipeline),
        max_upload_bytes: config.max_upload_bytes,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?
        .block_on(serve(&config, state))
}

async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
