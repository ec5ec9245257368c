//! KindMind gateway core
//!
//! Typed request/response contracts around a hosted generative model for an
//! accessibility assistant:
//!
//! - accessibility UI adaptation
//! - speech synthesis framed as WAV data URIs
//! - an empathetic companion chat and mood scoring
//! - sign-language video translation (translate, then speak)
//!
//! # Architecture
//!
//! - `contracts` - wire types and input validation
//! - `operations` - named prompt definitions and their output shapes
//! - `invoke` - render, call the provider under a deadline, check the output
//! - `provider` - provider trait and the Gemini REST client
//! - `engine` - domain operations built on invocations
//! - `gateway` - per-action mock or live sources
//!
//! ```no_run
//! use kindmind_core::{Gateway, GatewayConfig};
//! use kindmind_core::contracts::MoodRequest;
//!
//! # async fn run() -> kindmind_core::Result<()> {
//! let gateway = Gateway::from_config(&GatewayConfig::from_env()?)?;
//! let mood = gateway.get_mood_insights(&MoodRequest::new("I feel good")).await?;
//! println!("{:?}", mood.suggested_actions);
//! # Ok(())
//! # }
//! ```

#[path = "../contracts/mod.rs"]
pub mod contracts;

pub mod config;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod invoke;
pub mod media;
pub mod operations;
pub mod provider;
pub mod sentiment;

pub use config::{GatewayConfig, GatewayModes, SourceMode};
pub use contracts::GatewayAction;
pub use engine::AssistantEngine;
pub use error::{GatewayError, Result, TranslationStep};
pub use gateway::{Gateway, LiveSource, MockSource, ResponseSource};
pub use invoke::{InvocationOutput, Invoker};
pub use operations::{OperationRegistry, OperationSpec};
pub use provider::{GenerationRequest, GenerationResponse, GenerativeProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
