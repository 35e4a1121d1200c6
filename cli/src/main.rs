//! CLI entrypoint for chatnest
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use chatnest_application::{
    ChatController, ModelDispatcher, SessionService, SpeechPlayer, UnsupportedSpeech,
};
use chatnest_domain::VoiceSettings;
use chatnest_infrastructure::{
    CommandSpeechSynthesizer, ConfigLoader, FileConfig, HttpSessionApi, InMemorySessionStore,
    JsonFileMirror, JsonlConversationLogger, ReqwestChatTransport,
};
use chatnest_presentation::{
    ChatProxy, ChatRepl, Cli, Command, ConsoleFormatter, ConsolePresenter, ServerState,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?
    };
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_logging(cli.verbose, &config);
    info!("Starting chatnest");

    match cli.command() {
        Command::Serve { bind } => run_server(&config, bind).await,
        Command::Chat { model, server } => run_chat(&config, model, server).await,
        Command::Models => {
            let catalog = config.to_catalog()?;
            println!("{}", ConsoleFormatter::section_header("Models"));
            println!(
                "{}",
                ConsoleFormatter::models(&catalog, &config.client.default_model, |id| {
                    catalog
                        .get(id)
                        .ok()
                        .and_then(|m| m.api_key_env.as_deref())
                        .is_some_and(|var| std::env::var(var).is_ok_and(|v| !v.is_empty()))
                })
            );
            Ok(())
        }
    }
}

/// Initialize logging based on verbosity level, plus a daily log file when
/// `[logging] directory` is set.
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match &config.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "chatnest.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    guard
}

async fn run_server(config: &FileConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    // === Dependency Injection ===
    let sessions = SessionService::new(Arc::new(InMemorySessionStore::new()));
    let proxy = config
        .to_catalog()?
        .proxy_route()
        .map(|route| ChatProxy::new(route, config.server.proxy_upstream.clone()));
    if proxy.is_none() {
        info!("No proxied model configured, chat proxy disabled");
    }
    let state = ServerState::new(sessions, proxy);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    println!("Session server listening on http://{}", listener.local_addr()?);

    chatnest_presentation::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Shutting down");
    })
    .await?;
    Ok(())
}

async fn run_chat(config: &FileConfig, model: Option<String>, server: Option<String>) -> Result<()> {
    let api_base_url = server.unwrap_or_else(|| config.client.api_base_url.clone());
    let behavior = config.to_chat_behavior();

    // === Dependency Injection ===
    let api = Arc::new(HttpSessionApi::new(api_base_url.as_str(), config.request_timeout())?);
    let transport = Arc::new(ReqwestChatTransport::new(config.request_timeout())?);
    let dispatcher = ModelDispatcher::new(
        config.to_catalog()?,
        behavior.system_prompt.clone(),
        api_base_url.as_str(),
    );

    let mut controller = ChatController::new(api, transport, dispatcher, behavior)
        .with_observer(Arc::new(ConsolePresenter::new()));

    if let Some(data_dir) = ConfigLoader::data_dir() {
        controller = controller.with_local_mirror(Arc::new(JsonFileMirror::new(data_dir)));
    }
    if let Some(directory) = &config.logging.directory
        && let Some(logger) = JsonlConversationLogger::daily(directory)
    {
        info!("Writing conversation log to {}", logger.path().display());
        controller = controller.with_conversation_logger(Arc::new(logger));
    }
    if let Some(model) = model {
        controller.set_model(&model)?;
    }

    let speech = SpeechPlayer::new(
        Arc::new(CommandSpeechSynthesizer::detect()),
        Arc::new(UnsupportedSpeech),
        VoiceSettings::default(),
    );

    ChatRepl::new(controller, speech).run().await?;
    Ok(())
}
