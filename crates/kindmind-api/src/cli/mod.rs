//! CLI module for the KindMind gateway
//!
//! Runs the HTTP server or a single gateway action. Gateway failures are
//! printed to stderr and turned into an exit code; only I/O and start-up
//! problems surface as errors.

pub mod commands;

pub use commands::{load_config, Cli, Commands};

use kindmind_core::GatewayError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// The provider returned nothing usable
    GenerationFailed = 1,
    /// The provider was unreachable, throttled or too slow
    ProviderUnavailable = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    pub fn from_error(error: &GatewayError) -> Self {
        match error {
            GatewayError::Validation(_) => ExitCode::InvalidInput,
            GatewayError::Generation { .. } | GatewayError::Translation { .. } => {
                ExitCode::GenerationFailed
            }
            GatewayError::TransientProvider { .. } | GatewayError::Timeout { .. } => {
                ExitCode::ProviderUnavailable
            }
            GatewayError::Config(_) => ExitCode::ConfigError,
        }
    }
}

/// Run the CLI and return the exit code
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", e.error_code(), e);
            return Ok(ExitCode::from_error(&e));
        }
    };

    match cli.command {
        Commands::Serve { port, host } => commands::execute_serve(config, port, host).await,
        Commands::Speak {
            text,
            emergency,
            output,
        } => commands::execute_speak(&config, text, emergency, output).await,
        Commands::Chat { message, history } => {
            commands::execute_chat(&config, message, history).await
        }
        Commands::Mood { text } => commands::execute_mood(&config, text).await,
        Commands::Modes => commands::execute_modes(&config),
        Commands::Phrases => Ok(commands::execute_phrases()),
    }
}
