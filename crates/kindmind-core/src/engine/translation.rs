//! Sign-language translation: translate the clip, then speak the text
//!
//! The two provider calls run strictly in sequence. A failure in either is
//! reported as a translation error naming the step. A clip with no visible
//! signing still yields a full result: blank text is replaced by
//! [`NO_SIGNING_DETECTED`] and spoken like any other translation.

use serde::Deserialize;

use super::AssistantEngine;
use crate::contracts::{SignTranslationRequest, SignTranslationResult, Validate, DEFAULT_EMOTION};
use crate::error::{GatewayError, Result, TranslationStep};
use crate::operations::TRANSLATE_SIGN_LANGUAGE;

/// Spoken in place of an empty translation
pub const NO_SIGNING_DETECTED: &str = "No signing detected.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTranslation {
    translated_text: String,
    confidence_score: f64,
    emotion: Option<String>,
}

impl AssistantEngine {
    pub async fn translate_sign_language(
        &self,
        request: &SignTranslationRequest,
    ) -> Result<SignTranslationResult> {
        request.validate()?;

        let (text, confidence, emotion) = self
            .translate_step(request)
            .await
            .map_err(|e| GatewayError::translation(TranslationStep::Translate, e))?;

        tracing::debug!(
            confidence = confidence,
            emotion = %emotion,
            chars = text.chars().count(),
            "Sign language clip translated"
        );

        let speech = self
            .generate_speech(&text)
            .await
            .map_err(|e| GatewayError::translation(TranslationStep::Speak, e))?;

        Ok(SignTranslationResult {
            translated_text: text,
            translated_speech_uri: speech.media,
            confidence_score: confidence,
            emotion,
        })
    }

    async fn translate_step(&self, request: &SignTranslationRequest) -> Result<(String, f64, String)> {
        let input = serde_json::to_value(request)?;
        let raw: RawTranslation = self
            .invoker()
            .invoke_object(TRANSLATE_SIGN_LANGUAGE, &input)
            .await?;

        if !raw.confidence_score.is_finite() {
            return Err(self.invoker().registry().get(TRANSLATE_SIGN_LANGUAGE)?.failure());
        }

        let text = match raw.translated_text.trim() {
            "" => NO_SIGNING_DETECTED.to_string(),
            text => text.to_string(),
        };

        let emotion = raw
            .emotion
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EMOTION.to_string());

        Ok((text, raw.confidence_score.clamp(0.0, 1.0), emotion))
    }
}
