use anyhow::{anyhow, Context, Result};
use muse::audio::{default_sink, AudioSink, NullSink};
use muse::genai::{GeminiBackend, GenerationClient};
use muse::integration::{GenerationWorker, StudioConfig};
use muse::ui::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muse=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Muse");

    let config = StudioConfig::load().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Using {} (chat models {} / {})",
        config.genai.base_url, config.genai.fast_chat_model, config.genai.quality_chat_model
    );

    let backend = GeminiBackend::new(&config.genai);
    let client = GenerationClient::new(Arc::new(backend), config.genai.clone());

    let worker = GenerationWorker::new(client);
    let command_tx = worker.command_sender();
    let event_rx = worker.event_receiver();
    let worker_handle = worker.start_worker()?;

    let sink: Box<dyn AudioSink> = if config.audio.enable_output {
        default_sink()
    } else {
        info!("Audio output disabled in configuration");
        Box::new(NullSink::default())
    };

    let state = AppState::new(command_tx, event_rx, sink, config.audio.clone());
    ui::run(state).map_err(|e| anyhow!("GUI error: {}", e))?;

    if worker_handle.join().is_err() {
        warn!("Generation worker panicked");
    }
    info!("Muse exited");
    Ok(())
}
