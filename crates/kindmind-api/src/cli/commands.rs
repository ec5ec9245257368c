//! CLI command definitions for the KindMind gateway

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kindmind_core::contracts::{ChatTurn, CompanionRequest, MoodRequest, SpeechRequest};
use kindmind_core::emergency::{self, EMERGENCY_PHRASES};
use kindmind_core::media::DataUri;
use kindmind_core::config::ServerConfig;
use kindmind_core::{Gateway, GatewayConfig, GatewayError, GatewayModes, SourceMode};

use super::ExitCode;
use crate::handler::{create_router, ActionMode, HandlerState};

/// KindMind gateway CLI
///
/// Serve the HTTP API or call a single gateway action from the terminal.
#[derive(Parser, Debug)]
#[command(name = "kindmind")]
#[command(about = "KindMind gateway - accessibility assistant backed by a generative model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML or YAML configuration file
    #[arg(short, long, global = true, env = "KINDMIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Serve every action from canned values, ignoring configured modes
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Synthesize speech for text or an emergency phrase
    Speak {
        /// Text to speak
        #[arg(required_unless_present = "emergency")]
        text: Option<String>,

        /// Speak the emergency phrase at this position instead
        #[arg(short, long, conflicts_with = "text")]
        emergency: Option<usize>,

        /// Write the WAV file here instead of printing the data URI
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send one message to the empathetic companion
    Chat {
        /// Message to send
        message: String,

        /// JSON file holding earlier turns as `[{"role": "user", "text": "..."}]`
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Score the mood of a message and suggest actions
    Mood {
        /// Message to score
        text: String,
    },

    /// Show which source serves each action
    Modes,

    /// List the emergency phrases
    Phrases,
}

/// Load configuration from the file (if any), then the environment, then flags
pub fn load_config(cli: &Cli) -> Result<GatewayConfig, GatewayError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = GatewayConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => GatewayConfig::from_env()?,
    };

    if cli.mock {
        config.modes = GatewayModes::uniform(SourceMode::Mock);
    }

    Ok(config)
}

/// Bind `host:port`, resolving host names such as `localhost`
pub async fn bind_listener(server: &ServerConfig) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(server.bind_address()).await
}

pub async fn execute_serve(
    mut config: GatewayConfig,
    port: Option<u16>,
    host: Option<String>,
) -> anyhow::Result<ExitCode> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    let gateway = Gateway::from_config(&config)?;
    let state = HandlerState::new(gateway)?.with_body_limit(config.server.max_body_bytes);
    let router = create_router(state);

    let listener = bind_listener(&config.server).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        modes = ?config.modes,
        version = kindmind_core::VERSION,
        "Starting KindMind gateway"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("KindMind gateway stopped");
    Ok(ExitCode::Success)
}

pub async fn execute_speak(
    config: &GatewayConfig,
    text: Option<String>,
    emergency_index: Option<usize>,
    output: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let text = match (emergency_index, text) {
        (Some(index), _) => match emergency::phrase(index) {
            Some(phrase) => phrase.to_string(),
            None => {
                eprintln!(
                    "No emergency phrase at position {} (0-{} available)",
                    index,
                    EMERGENCY_PHRASES.len() - 1
                );
                return Ok(ExitCode::InvalidInput);
            }
        },
        (None, Some(text)) => text,
        (None, None) => String::new(),
    };

    let gateway = Gateway::from_config(config)?;
    let speech = match gateway.get_text_to_speech(&SpeechRequest::new(text)).await {
        Ok(speech) => speech,
        Err(e) => return Ok(report(&e)),
    };

    match output {
        Some(path) => {
            let audio = DataUri::parse(&speech.media)?;
            std::fs::write(&path, audio.data())?;
            println!("{}", path.display());
        }
        None => println!("{}", speech.media),
    }
    Ok(ExitCode::Success)
}

pub async fn execute_chat(
    config: &GatewayConfig,
    message: String,
    history: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let history: Vec<ChatTurn> = match history {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
        None => Vec::new(),
    };

    let gateway = Gateway::from_config(config)?;
    let request = CompanionRequest::new(message).with_history(history);
    match gateway.get_empathetic_response(&request).await {
        Ok(reply) => {
            println!("{}", reply.response);
            Ok(ExitCode::Success)
        }
        Err(e) => Ok(report(&e)),
    }
}

pub async fn execute_mood(config: &GatewayConfig, text: String) -> anyhow::Result<ExitCode> {
    let gateway = Gateway::from_config(config)?;
    match gateway.get_mood_insights(&MoodRequest::new(text)).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::Success)
        }
        Err(e) => Ok(report(&e)),
    }
}

pub fn execute_modes(config: &GatewayConfig) -> anyhow::Result<ExitCode> {
    let modes = ActionMode::list(&config.modes);
    println!("{}", serde_json::to_string_pretty(&modes)?);
    Ok(ExitCode::Success)
}

pub fn execute_phrases() -> ExitCode {
    for (index, phrase) in EMERGENCY_PHRASES.iter().enumerate() {
        println!("{}  {}", index, phrase);
    }
    ExitCode::Success
}

fn report(error: &GatewayError) -> ExitCode {
    eprintln!("{}: {}", error.error_code(), error);
    ExitCode::from_error(error)
}
