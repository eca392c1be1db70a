//! Concierge binary - composition root.
//!
//! Ties the Concierge crates into a single Telegram bot process:
//! 1. Load configuration from TOML and secrets from the environment
//! 2. Populate the catalog cache (fatal on failure)
//! 3. Start the background catalog refresh loop
//! 4. Build the chat orchestrator (prompts, language model, voice pipeline)
//! 5. Long-poll Telegram until interrupted

mod bot;
mod cli;
mod telegram;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use concierge_catalog::{GoogleCatalogGateway, RefreshableCache};
use concierge_chat::{
    ChatOrchestrator, OpenAiChatModel, PromptAssembler, ResponseGenerator, SessionStore,
};
use concierge_core::config::ConciergeConfig;
use concierge_core::types::Locale;
use concierge_core::ConciergeError;
use concierge_voice::{FfmpegConverter, VoicePipeline, WhisperApiTranscriber};

use bot::Bot;
use cli::CliArgs;
use telegram::TelegramClient;

/// Read a required secret from the environment.
fn require_env(name: &str) -> Result<String, ConciergeError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConciergeError::Startup(format!("{name} is not set")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can seed the filter.
    let config_file = args.resolve_config_path();
    let loaded = ConciergeConfig::load(&config_file);
    let config_level = loaded
        .as_ref()
        .map(|c| c.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(args.resolve_log_level(&config_level))
            }),
        )
        .init();

    tracing::info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Using default configuration");
            ConciergeConfig::default()
        }
    };

    // Secrets.
    let telegram_token = require_env("TELEGRAM_BOT_TOKEN")?;
    let openai_key = require_env("OPENAI_API_KEY")?;
    let google_key = require_env("GOOGLE_API_KEY")?;

    // Catalog. The first population must succeed.
    let gateway = GoogleCatalogGateway::new(config.catalog.clone(), google_key)?;
    let cache = Arc::new(RefreshableCache::new(Arc::new(gateway), config.cache.ttl()));
    match cache.initialize().await {
        Ok(snapshot) => {
            for locale in Locale::ALL {
                tracing::info!(
                    locale = %locale,
                    courses = snapshot.courses_for(locale).len(),
                    knowledge_chars = snapshot.knowledge_for(locale).chars().count(),
                    "Catalog loaded"
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Initial catalog load failed; the bot cannot start");
            return Err(e.into());
        }
    }
    Arc::clone(&cache).spawn_refresh_loop(config.cache.refresh_interval());

    // Chat.
    let prompt_dir = args.resolve_prompt_dir(&config.general.prompt_dir);
    let prompts = Arc::new(PromptAssembler::load(&prompt_dir));
    tracing::info!(dir = %prompt_dir.display(), "Prompt templates loaded");

    let model = OpenAiChatModel::new(&config.llm, openai_key.clone())?;
    let generator = Arc::new(ResponseGenerator::new(Arc::new(model), &config.llm));
    tracing::info!(
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "Language model configured"
    );

    // Voice.
    let converter = FfmpegConverter::new(
        config.voice.ffmpeg_path.clone(),
        Duration::from_secs(config.voice.timeout_secs.max(1)),
    );
    let transcriber = WhisperApiTranscriber::new(&config.voice, openai_key)?;
    let work_dir = config.voice.work_dir();
    let voice = Arc::new(VoicePipeline::new(
        Arc::new(converter),
        Arc::new(transcriber),
        work_dir.clone(),
    ));
    tracing::info!(
        work_dir = %work_dir.display(),
        model = %config.voice.model,
        "Voice pipeline ready"
    );

    let orchestrator = Arc::new(
        ChatOrchestrator::new(
            cache,
            Arc::new(SessionStore::new(config.session.max_history)),
            prompts,
            generator,
            voice,
        )
        .with_default_voice_locale(config.voice.default_locale()),
    );

    // Transport.
    let poll_timeout_secs = config.telegram.poll_timeout_secs;
    let client = TelegramClient::new(
        &config.telegram.api_base,
        &telegram_token,
        Duration::from_secs(poll_timeout_secs),
    )?;
    match client.get_me().await {
        Ok(me) => tracing::info!(
            bot_id = me.id,
            name = %me.first_name,
            username = me.username.as_deref().unwrap_or(""),
            "Telegram bot authenticated"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Telegram token rejected");
            return Err(e.into());
        }
    }

    let bot = Arc::new(Bot::new(Arc::new(client), orchestrator, poll_timeout_secs));

    tokio::select! {
        _ = bot.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown requested");
        }
    }

    Ok(())
}
