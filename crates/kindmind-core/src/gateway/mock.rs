//! Deterministic responses that never contact a provider
//!
//! Mood insights score messages with the two-way keyword heuristic, then go
//! through the same three-bucket table as live mode. A message without
//! "happy" or "good" therefore scores -0.4 and receives the neutral pair, not
//! the "It's okay to feel that way" pair a plain two-way classifier would pick.

use async_trait::async_trait;

use super::ResponseSource;
use crate::config::SourceMode;
use crate::contracts::{
    AccessibilityProfile, CompanionReply, CompanionRequest, MoodRequest, SentimentResult,
    SignTranslationRequest, SignTranslationResult, SpeechRequest, SpeechResult, UiConfig,
};
use crate::error::Result;
use crate::media::{speech_data_uri, PcmFormat};
use crate::sentiment::{keyword_score, SentimentBucket};

/// Text returned by the demonstration translation
pub const DEMO_TRANSLATION: &str =
    "Hello! Thank you for using KindMind. This is a demonstration of the sign language translation feature.";

/// Confidence reported by the demonstration translation
pub const DEMO_CONFIDENCE: f64 = 0.92;

/// Length of the silent clip returned for speech
const SILENCE_MS: u32 = 250;

const COMFORT_REPLY: &str = "I'm really sorry to hear that. That must feel difficult. I'm here for you. How can I help you feel a little better?";
const OPEN_REPLY: &str = "I'm here with you. Tell me more.";
const POSITIVE_REPLY: &str = "That's wonderful to hear! I'm glad you're feeling good. What made today feel this way?";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        Self
    }

    fn silent_speech() -> Result<SpeechResult> {
        let frames = (PcmFormat::SPEECH.sample_rate * SILENCE_MS / 1000) as usize;
        let pcm = vec![0u8; frames * 2];
        Ok(speech_data_uri(&pcm)?.into())
    }
}

#[async_trait]
impl ResponseSource for MockSource {
    fn mode(&self) -> SourceMode {
        SourceMode::Mock
    }

    async fn accessibility_suggestions(&self, profile: &AccessibilityProfile) -> Result<UiConfig> {
        Ok(UiConfig::derive_from(profile))
    }

    async fn text_to_speech(&self, _request: &SpeechRequest) -> Result<SpeechResult> {
        Self::silent_speech()
    }

    async fn empathetic_response(&self, request: &CompanionRequest) -> Result<CompanionReply> {
        let reply = match keyword_score(&request.user_input).bucket() {
            SentimentBucket::Positive => POSITIVE_REPLY,
            _ if request.history.is_empty() => COMFORT_REPLY,
            _ => OPEN_REPLY,
        };
        Ok(CompanionReply {
            response: reply.to_string(),
        })
    }

    async fn mood_insights(&self, request: &MoodRequest) -> Result<SentimentResult> {
        Ok(SentimentResult::from_score(keyword_score(&request.user_input)))
    }

    async fn sign_language_translation(
        &self,
        _request: &SignTranslationRequest,
    ) -> Result<SignTranslationResult> {
        let speech = Self::silent_speech()?;
        Ok(SignTranslationResult {
            translated_text: DEMO_TRANSLATION.to_string(),
            translated_speech_uri: speech.media,
            confidence_score: DEMO_CONFIDENCE,
            emotion: crate::contracts::DEFAULT_EMOTION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{decode_wav, DataUri};

    #[tokio::test]
    async fn test_silent_speech_is_valid_wav() {
        let speech = MockSource.text_to_speech(&SpeechRequest::new("")).await.unwrap();
        let uri = DataUri::parse(&speech.media).unwrap();
        let (format, pcm) = decode_wav(uri.data()).unwrap();
        assert_eq!(format, PcmFormat::SPEECH);
        assert!(pcm.iter().all(|b| *b == 0));
        assert_eq!(pcm.len(), 12_000);
    }

    #[tokio::test]
    async fn test_mood_without_keywords_uses_neutral_pair() {
        let result = MockSource
            .mood_insights(&MoodRequest::new("I am not feeling well"))
            .await
            .unwrap();
        assert_eq!(result.sentiment_score.value(), -0.4);
        assert_eq!(
            result.suggested_actions[0],
            "Thanks for sharing how you feel. Take a moment to notice what is on your mind."
        );
        assert!(result
            .suggested_actions
            .iter()
            .all(|a| !a.starts_with("It's okay to feel that way")));
    }

    #[tokio::test]
    async fn test_companion_reply_never_empty() {
        for text in ["I am not feeling well", "I feel good", "hmm"] {
            let reply = MockSource
                .empathetic_response(&CompanionRequest::new(text))
                .await
                .unwrap();
            assert!(!reply.response.is_empty());
        }
    }
}
