//! Text-to-speech contract

use serde::{Deserialize, Serialize};

use super::Validate;
use crate::error::{GatewayError, Result};
use crate::media::DataUri;

/// Longest text sent to the speech model in one call
pub const MAX_SPEECH_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Validate for SpeechRequest {
    // empty text is allowed through; the speech step decides what it yields
    fn validate(&self) -> Result<()> {
        let chars = self.text.chars().count();
        if chars > MAX_SPEECH_CHARS {
            return Err(GatewayError::validation(format!(
                "text is {} characters, limit is {}",
                chars, MAX_SPEECH_CHARS
            )));
        }
        Ok(())
    }
}

/// Synthesized audio as `data:audio/wav;base64,...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResult {
    pub media: String,
}

impl From<DataUri> for SpeechResult {
    fn from(uri: DataUri) -> Self {
        Self {
            media: uri.to_string(),
        }
    }
}
