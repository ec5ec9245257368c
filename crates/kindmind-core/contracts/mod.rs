//! KindMind gateway contract definitions
//!
//! Request and response shapes for every gateway action, exactly as the UI
//! layer sends and receives them (camelCase JSON). All values are transient:
//! created per request, discarded after the response.
//!
//! # Design Principles
//!
//! - **Validated before dispatch**: every request type implements [`Validate`];
//!   enum membership is enforced by deserialization
//! - **Stateless**: no value outlives the request that created it
//! - **Provider-agnostic**: nothing here knows which model answered

pub mod accessibility;
pub mod companion;
pub mod sign_language;
pub mod speech;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GatewayError, Result};

pub use accessibility::{
    AccessibilityNeeds, AccessibilityProfile, CommunicationMode, ImpairmentLevel, UiConfig,
    VisionLevel,
};
pub use companion::{ChatRole, ChatTurn, CompanionReply, CompanionRequest, MoodRequest, SentimentResult};
pub use sign_language::{SignTranslationRequest, SignTranslationResult, DEFAULT_EMOTION};
pub use speech::{SpeechRequest, SpeechResult, MAX_SPEECH_CHARS};

/// Input-shape check applied before any provider call
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Deserialize and validate an untyped request body
///
/// Unknown enum members, missing fields and wrong types all surface as
/// [`GatewayError::Validation`].
pub fn parse_input<T>(value: serde_json::Value) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let input: T = serde_json::from_value(value)
        .map_err(|e| GatewayError::validation(e.to_string()))?;
    input.validate()?;
    Ok(input)
}

/// Externally callable gateway actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayAction {
    AccessibilitySuggestions,
    TextToSpeech,
    EmpatheticResponse,
    MoodInsights,
    SignLanguageTranslation,
}

impl GatewayAction {
    pub const ALL: [GatewayAction; 5] = [
        GatewayAction::AccessibilitySuggestions,
        GatewayAction::TextToSpeech,
        GatewayAction::EmpatheticResponse,
        GatewayAction::MoodInsights,
        GatewayAction::SignLanguageTranslation,
    ];

    /// Name used by the UI layer
    pub fn name(&self) -> &'static str {
        match self {
            GatewayAction::AccessibilitySuggestions => "getAccessibilitySuggestions",
            GatewayAction::TextToSpeech => "getTextToSpeech",
            GatewayAction::EmpatheticResponse => "getEmpatheticResponse",
            GatewayAction::MoodInsights => "getMoodInsights",
            GatewayAction::SignLanguageTranslation => "getSignLanguageTranslation",
        }
    }

    /// Short label used in metrics and environment variable names
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayAction::AccessibilitySuggestions => "accessibility",
            GatewayAction::TextToSpeech => "speech",
            GatewayAction::EmpatheticResponse => "companion",
            GatewayAction::MoodInsights => "mood",
            GatewayAction::SignLanguageTranslation => "sign_language",
        }
    }
}

impl fmt::Display for GatewayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_input_rejects_unknown_enum_member() {
        let err = parse_input::<AccessibilityProfile>(json!({
            "accessibilityNeeds": {"vision": "blurry", "motor": "none", "cognitive": "none"},
            "preferredCommunicationMode": "text"
        }))
        .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_parse_input_rejects_missing_field() {
        let err = parse_input::<AccessibilityProfile>(json!({
            "accessibilityNeeds": {"vision": "low", "motor": "none"},
            "preferredCommunicationMode": "text"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("cognitive"));
    }

    #[test]
    fn test_action_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            GatewayAction::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(labels.len(), GatewayAction::ALL.len());
    }
}
