//! Domain operations
//!
//! [`AssistantEngine`] turns typed requests into operation invocations and
//! shapes the validated outputs into response contracts. It always talks to
//! a provider; canned answers live in the gateway's mock source.

pub mod speech;
mod translation;

pub use translation::NO_SIGNING_DETECTED;

use serde_json::json;

use crate::contracts::{
    AccessibilityProfile, CompanionReply, CompanionRequest, SentimentResult, SpeechResult, UiConfig,
};
use crate::error::Result;
use crate::invoke::{InvocationOutput, Invoker};
use crate::operations::{ADAPT_ACCESSIBILITY_UI, ANALYZE_SENTIMENT, EMPATHETIC_COMPANION, GENERATE_SPEECH};
use crate::sentiment::SentimentScore;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSentiment {
    sentiment_score: f64,
}

/// Provider-backed implementation of every domain operation
pub struct AssistantEngine {
    invoker: Invoker,
}

impl AssistantEngine {
    pub fn new(invoker: Invoker) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Recommend a UI configuration for an accessibility profile
    pub async fn adapt_accessibility_ui(&self, profile: &AccessibilityProfile) -> Result<UiConfig> {
        let input = serde_json::to_value(profile)?;
        let mut config: UiConfig = self
            .invoker
            .invoke_object(ADAPT_ACCESSIBILITY_UI, &input)
            .await?;

        if config.reconcile_sign_support(profile) {
            tracing::info!(
                mode = %profile.preferred_communication_mode,
                "Corrected sign language support to follow communication mode"
            );
        }
        Ok(config)
    }

    /// Synthesize speech and frame it as `data:audio/wav;base64,...`
    pub async fn generate_speech(&self, text: &str) -> Result<SpeechResult> {
        let output = self
            .invoker
            .invoke(GENERATE_SPEECH, &json!({ "text": text }))
            .await?;

        match output {
            InvocationOutput::Audio(blob) => Ok(speech::audio_data_uri(blob)?.into()),
            _ => Err(self.invoker.registry().get(GENERATE_SPEECH)?.failure()),
        }
    }

    /// Companion reply with the whole conversation replayed in order
    pub async fn empathetic_companion(&self, request: &CompanionRequest) -> Result<CompanionReply> {
        let output = self
            .invoker
            .invoke_with_history(
                EMPATHETIC_COMPANION,
                &json!({ "userInput": request.user_input }),
                &request.history,
            )
            .await?;

        match output {
            InvocationOutput::Text(text) => Ok(CompanionReply {
                response: text.trim().to_string(),
            }),
            _ => Err(self.invoker.registry().get(EMPATHETIC_COMPANION)?.failure()),
        }
    }

    /// Score a message; out-of-range scores are clamped into [-1, 1]
    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentScore> {
        let raw: RawSentiment = self
            .invoker
            .invoke_object(ANALYZE_SENTIMENT, &json!({ "text": text }))
            .await?;

        SentimentScore::clamped(raw.sentiment_score)
            .ok_or_else(|| match self.invoker.registry().get(ANALYZE_SENTIMENT) {
                Ok(spec) => spec.failure(),
                Err(e) => e,
            })
    }

    /// Provider score plus the fixed suggestions for its bucket
    pub async fn mood_insights(&self, text: &str) -> Result<SentimentResult> {
        let score = self.analyze_sentiment(text).await?;
        tracing::debug!(
            score = score.value(),
            bucket = score.bucket().as_str(),
            "Sentiment scored"
        );
        Ok(SentimentResult::from_score(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{CommunicationMode, ImpairmentLevel, SignTranslationRequest, VisionLevel};
    use crate::error::TranslationStep;
    use crate::operations::{OperationRegistry, TRANSLATE_SIGN_LANGUAGE};
    use crate::provider::{GenerationResponse, MockGenerativeProvider};
    use mockall::Sequence;
    use std::sync::Arc;
    use std::time::Duration;

    fn engine(mock: MockGenerativeProvider) -> AssistantEngine {
        AssistantEngine::new(Invoker::new(
            Arc::new(mock),
            Arc::new(OperationRegistry::builtin()),
            Duration::from_secs(2),
        ))
    }

    fn base_mock() -> MockGenerativeProvider {
        let mut mock = MockGenerativeProvider::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn test_sign_support_follows_mode_even_if_model_disagrees() {
        let mut mock = base_mock();
        mock.expect_generate().returning(|_| {
            Ok(GenerationResponse::text(
                r#"{"fontSize":"large","contrastLevel":"high","voiceNavigationEnabled":true,
                   "gestureControlEnabled":false,"signLanguageSupport":false,"preferredLanguage":"en"}"#,
            ))
        });
        let profile = AccessibilityProfile::new(
            VisionLevel::Low,
            ImpairmentLevel::Mild,
            ImpairmentLevel::None,
            CommunicationMode::Sign,
        );
        let config = engine(mock).adapt_accessibility_ui(&profile).await.unwrap();
        assert!(config.sign_language_support);
        assert_eq!(config.font_size, "large");
    }

    #[tokio::test]
    async fn test_mood_insights_clamps_and_buckets() {
        let mut mock = base_mock();
        mock.expect_generate()
            .returning(|_| Ok(GenerationResponse::text(r#"{"sentimentScore": 4.2}"#)));
        let result = engine(mock).mood_insights("best day ever").await.unwrap();
        assert_eq!(result.sentiment_score.value(), 1.0);
        assert_eq!(result.suggested_actions[1], "Keep embracing that feeling!");
    }

    #[tokio::test]
    async fn test_speech_is_framed_as_wav() {
        let mut mock = base_mock();
        mock.expect_generate()
            .withf(|req| req.operation == GENERATE_SPEECH && req.contents[0].text() == "hello")
            .returning(|_| Ok(GenerationResponse::audio("audio/L16;codec=pcm;rate=24000", vec![0u8; 100])));
        let speech = engine(mock).generate_speech("hello").await.unwrap();
        assert!(speech.media.starts_with("data:audio/wav;base64,"));
    }

    #[tokio::test]
    async fn test_translation_runs_translate_then_speak() {
        let mut seq = Sequence::new();
        let mut mock = base_mock();
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|req| req.operation == TRANSLATE_SIGN_LANGUAGE)
            .returning(|_| {
                Ok(GenerationResponse::text(
                    r#"{"translatedText":"Where is the hospital?","confidenceScore":1.3}"#,
                ))
            });
        mock.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|req| req.operation == GENERATE_SPEECH && req.contents[0].text() == "Where is the hospital?")
            .returning(|_| Ok(GenerationResponse::audio("audio/L16;rate=24000", vec![0u8; 8])));

        let result = engine(mock)
            .translate_sign_language(&SignTranslationRequest::new("data:video/webm;base64,AAAA"))
            .await
            .unwrap();
        assert_eq!(result.translated_text, "Where is the hospital?");
        assert_eq!(result.confidence_score, 1.0);
        assert_eq!(result.emotion, "neutral");
        assert!(result.translated_speech_uri.starts_with("data:audio/wav;base64,"));
    }

    #[tokio::test]
    async fn test_blank_translation_speaks_placeholder() {
        let mut mock = base_mock();
        mock.expect_generate()
            .withf(|req| req.operation == TRANSLATE_SIGN_LANGUAGE)
            .returning(|_| Ok(GenerationResponse::text(r#"{"translatedText":"  ","confidenceScore":0.02}"#)));
        mock.expect_generate()
            .times(1)
            .withf(|req| req.operation == GENERATE_SPEECH && req.contents[0].text() == NO_SIGNING_DETECTED)
            .returning(|_| Ok(GenerationResponse::audio("audio/L16;rate=24000", vec![0u8; 8])));

        let result = engine(mock)
            .translate_sign_language(&SignTranslationRequest::new("data:video/webm;base64,AAAA"))
            .await
            .unwrap();
        assert_eq!(result.translated_text, NO_SIGNING_DETECTED);
        assert_eq!(result.confidence_score, 0.02);
    }

    #[tokio::test]
    async fn test_speak_failure_names_speak_step() {
        let mut mock = base_mock();
        mock.expect_generate()
            .withf(|req| req.operation == TRANSLATE_SIGN_LANGUAGE)
            .returning(|_| {
                Ok(GenerationResponse::text(
                    r#"{"translatedText":"Hi","confidenceScore":0.4,"emotion":"happy"}"#,
                ))
            });
        mock.expect_generate()
            .withf(|req| req.operation == GENERATE_SPEECH)
            .returning(|_| Ok(GenerationResponse::default()));

        let err = engine(mock)
            .translate_sign_language(&SignTranslationRequest::new("data:video/webm;base64,AAAA"))
            .await
            .unwrap_err();
        assert_eq!(err.failed_step(), Some(TranslationStep::Speak));
        assert!(err.to_string().contains("Failed to generate speech from text."));
    }

    #[tokio::test]
    async fn test_malformed_video_is_validation_not_translation() {
        let mut mock = base_mock();
        mock.expect_generate().times(0);
        let err = engine(mock)
            .translate_sign_language(&SignTranslationRequest::new("data:video/webm,AAAA"))
            .await
            .unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(err.failed_step(), None);
    }
}
