//! Generative provider interface
//!
//! The gateway talks to the hosted model through [`GenerativeProvider`]. One
//! call is one request: system instruction, ordered turns, and the expected
//! response modality. [`gemini::GeminiProvider`] is the shipped implementation;
//! tests substitute scripted or mocked providers.

pub mod gemini;

pub use gemini::{GeminiProvider, GeminiProviderBuilder};

use async_trait::async_trait;

use crate::contracts::ChatRole;
use crate::error::Result;
use crate::media::DataUri;

/// Binary payload carried inline in a request or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl From<DataUri> for Blob {
    fn from(uri: DataUri) -> Self {
        Self {
            mime_type: uri.mime_type().to_string(),
            data: uri.into_data(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineData(Blob),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(t) => Some(t),
            Part::InlineData(_) => None,
        }
    }
}

/// One turn of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: ChatRole::User,
            parts,
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// Which configured model serves the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Text,
    Vision,
    Speech,
}

/// Expected response modality
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    /// JSON object, optionally constrained by a response schema
    Json(Option<serde_json::Value>),
    Audio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Operation name, used for logging and error messages
    pub operation: String,
    pub model: ModelKind,
    pub system_instruction: Option<String>,
    /// Turns in chronological order, newest last
    pub contents: Vec<Content>,
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
}

/// What the provider returned; either field may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    pub text: Option<String>,
    pub audio: Option<Blob>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            audio: None,
        }
    }

    pub fn audio(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            text: None,
            audio: Some(Blob {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map(str::is_empty).unwrap_or(true) && self.audio.is_none()
    }
}

/// Hosted generative model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Provider name for logs and health output
    fn name(&self) -> &'static str;

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}
