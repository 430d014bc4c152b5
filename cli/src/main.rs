//! CLI entrypoint for chat-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use relay_application::{GenerationSource, SessionHub, TranscriptRepository, TranscriptStore};
use relay_domain::SessionKey;
use relay_infrastructure::{
    BackendKind, ConfigLoader, EchoSource, FileConfig, HttpStreamSource,
    InMemoryTranscriptRepository, JsonFileTranscriptRepository, JsonlConversationLogger,
    StorageKind,
};
use relay_presentation::{ChatRepl, Cli, Command, ConsoleFormatter, ReplConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, config.logging.dir.as_deref())?;

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }

    let color = config.repl.color && !cli.no_color;
    if !color {
        colored::control::set_override(false);
    }

    let user = cli.user.clone().unwrap_or_else(|| config.repl.user.clone());
    let key = SessionKey::try_new(user).context("Session key cannot be empty")?;

    info!(session = %key, backend = ?config.backend.kind, "Starting chat-relay");

    // === Dependency Injection ===
    let hub = Arc::new(build_hub(&config)?);

    match cli.selected_command() {
        Command::History { json } => {
            let transcript = hub.history(&key).await?;
            if json {
                println!("{}", ConsoleFormatter::format_history_json(&transcript));
            } else {
                println!("{}", ConsoleFormatter::format_history(&key, &transcript));
            }
        }
        Command::Chat => {
            let repl = ChatRepl::new(hub, key).with_config(ReplConfig::default().with_color(color));
            repl.run().await?;
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` takes precedence over `-v`. With a log directory configured,
/// output goes to a daily file so the terminal only shows the chat.
fn init_logging(verbose: u8, dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(dir) = dir else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(dir, "chat-relay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(Some(guard))
}

fn build_hub(config: &FileConfig) -> Result<SessionHub> {
    let repository: Arc<dyn TranscriptRepository> = match config.storage.kind {
        StorageKind::File => {
            let dir = config.storage.resolved_dir();
            info!(dir = %dir.display(), "Using file storage");
            Arc::new(JsonFileTranscriptRepository::new(dir))
        }
        StorageKind::Memory => Arc::new(InMemoryTranscriptRepository::new()),
    };

    let backend = &config.backend;
    let source: Arc<dyn GenerationSource> = match backend.kind {
        BackendKind::Http => {
            let token = backend.api_token();
            if token.is_none()
                && let Some(name) = &backend.api_token_env
            {
                warn!("{} is not set; sending requests without a token", name);
            }
            Arc::new(HttpStreamSource::new(
                &backend.url,
                token,
                Duration::from_secs(backend.connect_timeout_seconds),
            )?)
        }
        BackendKind::Echo => Arc::new(EchoSource::new(Duration::from_millis(
            backend.echo_delay_ms,
        ))),
    };

    let store = Arc::new(TranscriptStore::new(repository));
    let mut hub = SessionHub::new(store, source, config.relay.to_relay_config());

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::new(path) {
            Some(logger) => {
                info!(path = %logger.path().display(), "Conversation log enabled");
                hub = hub.with_conversation_logger(Arc::new(logger));
            }
            None => warn!("Conversation log disabled: cannot open {}", path.display()),
        }
    }

    Ok(hub)
}
