//! Gateway actions
//!
//! Every action validates its input, then asks the [`ResponseSource`] chosen
//! for it at start-up. The choice is fixed per action and can be inspected
//! through [`Gateway::mode`].

mod mock;

pub use mock::{MockSource, DEMO_CONFIDENCE, DEMO_TRANSLATION};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{GatewayConfig, GatewayModes, SourceMode};
use crate::contracts::{
    AccessibilityProfile, CompanionReply, CompanionRequest, GatewayAction, MoodRequest,
    SentimentResult, SignTranslationRequest, SignTranslationResult, SpeechRequest, SpeechResult,
    UiConfig, Validate,
};
use crate::engine::AssistantEngine;
use crate::error::{GatewayError, Result};
use crate::invoke::Invoker;
use crate::operations::OperationRegistry;
use crate::provider::{GeminiProvider, GenerativeProvider};

/// Where action results come from
#[async_trait]
pub trait ResponseSource: Send + Sync {
    fn mode(&self) -> SourceMode;

    async fn accessibility_suggestions(&self, profile: &AccessibilityProfile) -> Result<UiConfig>;

    async fn text_to_speech(&self, request: &SpeechRequest) -> Result<SpeechResult>;

    async fn empathetic_response(&self, request: &CompanionRequest) -> Result<CompanionReply>;

    async fn mood_insights(&self, request: &MoodRequest) -> Result<SentimentResult>;

    async fn sign_language_translation(
        &self,
        request: &SignTranslationRequest,
    ) -> Result<SignTranslationResult>;
}

/// Delegates to the provider-backed engine and propagates its outcome unchanged
pub struct LiveSource {
    engine: AssistantEngine,
}

impl LiveSource {
    pub fn new(engine: AssistantEngine) -> Self {
        Self { engine }
    }

    /// Build the engine around a provider with the builtin operations
    pub fn with_provider(provider: Arc<dyn GenerativeProvider>, config: &GatewayConfig) -> Self {
        let invoker = Invoker::new(
            provider,
            Arc::new(OperationRegistry::builtin()),
            config.provider.timeout(),
        );
        Self::new(AssistantEngine::new(invoker))
    }
}

#[async_trait]
impl ResponseSource for LiveSource {
    fn mode(&self) -> SourceMode {
        SourceMode::Live
    }

    async fn accessibility_suggestions(&self, profile: &AccessibilityProfile) -> Result<UiConfig> {
        self.engine.adapt_accessibility_ui(profile).await
    }

    async fn text_to_speech(&self, request: &SpeechRequest) -> Result<SpeechResult> {
        self.engine.generate_speech(&request.text).await
    }

    async fn empathetic_response(&self, request: &CompanionRequest) -> Result<CompanionReply> {
        self.engine.empathetic_companion(request).await
    }

    async fn mood_insights(&self, request: &MoodRequest) -> Result<SentimentResult> {
        self.engine.mood_insights(&request.user_input).await
    }

    async fn sign_language_translation(
        &self,
        request: &SignTranslationRequest,
    ) -> Result<SignTranslationResult> {
        self.engine.translate_sign_language(request).await
    }
}

/// The externally callable action surface
#[derive(Clone)]
pub struct Gateway {
    modes: GatewayModes,
    mock: Arc<dyn ResponseSource>,
    live: Option<Arc<dyn ResponseSource>>,
}

impl Gateway {
    /// Gateway with explicit sources; a live source is required if any action is live
    pub fn new(modes: GatewayModes, live: Option<Arc<dyn ResponseSource>>) -> Result<Self> {
        if modes.any_live() && live.is_none() {
            return Err(GatewayError::config(
                "an action is configured as live but no provider is available",
            ));
        }
        Ok(Self {
            modes,
            mock: Arc::new(MockSource::new()),
            live,
        })
    }

    /// Every action served by canned values
    pub fn mock() -> Self {
        Self {
            modes: GatewayModes::default(),
            mock: Arc::new(MockSource::new()),
            live: None,
        }
    }

    /// Build from validated configuration; the Gemini provider is created only when needed
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let live = if config.modes.any_live() {
            let provider: Arc<dyn GenerativeProvider> =
                Arc::new(GeminiProvider::from_config(&config.provider)?);
            tracing::info!(
                provider = provider.name(),
                text_model = %config.provider.text_model,
                tts_model = %config.provider.tts_model,
                "Live provider configured"
            );
            Some(Arc::new(LiveSource::with_provider(provider, config)) as Arc<dyn ResponseSource>)
        } else {
            None
        };
        Self::new(config.modes, live)
    }

    /// Build around a caller-supplied provider
    pub fn with_provider(config: &GatewayConfig, provider: Arc<dyn GenerativeProvider>) -> Result<Self> {
        let live: Arc<dyn ResponseSource> = Arc::new(LiveSource::with_provider(provider, config));
        Self::new(config.modes, Some(live))
    }

    pub fn mode(&self, action: GatewayAction) -> SourceMode {
        self.modes.get(action)
    }

    pub fn modes(&self) -> GatewayModes {
        self.modes
    }

    fn source(&self, action: GatewayAction) -> Result<&dyn ResponseSource> {
        match self.modes.get(action) {
            SourceMode::Mock => Ok(self.mock.as_ref()),
            SourceMode::Live => self
                .live
                .as_deref()
                .ok_or_else(|| GatewayError::config(format!("{} is live but no provider is configured", action))),
        }
    }

    pub async fn get_accessibility_suggestions(&self, profile: &AccessibilityProfile) -> Result<UiConfig> {
        profile.validate()?;
        self.source(GatewayAction::AccessibilitySuggestions)?
            .accessibility_suggestions(profile)
            .await
    }

    pub async fn get_text_to_speech(&self, request: &SpeechRequest) -> Result<SpeechResult> {
        request.validate()?;
        self.source(GatewayAction::TextToSpeech)?
            .text_to_speech(request)
            .await
    }

    pub async fn get_empathetic_response(&self, request: &CompanionRequest) -> Result<CompanionReply> {
        request.validate()?;
        self.source(GatewayAction::EmpatheticResponse)?
            .empathetic_response(request)
            .await
    }

    pub async fn get_mood_insights(&self, request: &MoodRequest) -> Result<SentimentResult> {
        request.validate()?;
        self.source(GatewayAction::MoodInsights)?
            .mood_insights(request)
            .await
    }

    pub async fn get_sign_language_translation(
        &self,
        request: &SignTranslationRequest,
    ) -> Result<SignTranslationResult> {
        request.validate()?;
        self.source(GatewayAction::SignLanguageTranslation)?
            .sign_language_translation(request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{CommunicationMode, ImpairmentLevel, VisionLevel};
    use crate::provider::{GenerationResponse, MockGenerativeProvider};

    #[test]
    fn test_live_mode_without_source_rejected() {
        let modes = GatewayModes::uniform(SourceMode::Live);
        assert!(Gateway::new(modes, None).is_err());
    }

    #[test]
    fn test_from_config_mock_needs_no_key() {
        let gateway = Gateway::from_config(&GatewayConfig::default()).unwrap();
        for action in GatewayAction::ALL {
            assert_eq!(gateway.mode(action), SourceMode::Mock);
        }
    }

    #[tokio::test]
    async fn test_mixed_modes_route_per_action() {
        let mut provider = MockGenerativeProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .times(1)
            .returning(|_| Ok(GenerationResponse::text(r#"{"sentimentScore": -0.9}"#)));

        let config = GatewayConfig::builder()
            .action_mode(GatewayAction::MoodInsights, SourceMode::Live)
            .build();
        let gateway = Gateway::with_provider(&config, Arc::new(provider)).unwrap();

        let mood = gateway.get_mood_insights(&MoodRequest::new("awful")).await.unwrap();
        assert_eq!(mood.sentiment_score.value(), -0.9);

        let profile = AccessibilityProfile::new(
            VisionLevel::None,
            ImpairmentLevel::None,
            ImpairmentLevel::None,
            CommunicationMode::Text,
        );
        let ui = gateway.get_accessibility_suggestions(&profile).await.unwrap();
        assert!(!ui.sign_language_support);
    }

    #[tokio::test]
    async fn test_validation_precedes_source() {
        let gateway = Gateway::mock();
        let err = gateway
            .get_empathetic_response(&CompanionRequest::new(""))
            .await
            .unwrap_err();
        assert!(err.is_user_error());
    }
}
