//! Gemini `generateContent` client
//!
//! Features:
//! - One pooled reqwest client per provider
//! - Retry with exponential backoff on rate limiting, 5xx and network errors
//! - Text, JSON (with response schema), multimodal input and audio output
//!
//! Permanent failures (other 4xx, undecodable bodies) are returned on the
//! first attempt.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

use super::{Blob, Content, GenerationRequest, GenerationResponse, GenerativeProvider, ModelKind, Part, ResponseFormat};
use crate::config::ProviderConfig;
use crate::error::{GatewayError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<WireContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

/// Gemini REST provider
pub struct GeminiProvider {
    client: Client,
    api_key: SecretString,
    config: ProviderConfig,
}

impl GeminiProvider {
    /// Create a provider from configuration; the API key must be present
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|_| config.has_api_key())
            .ok_or_else(|| GatewayError::config("Gemini provider requires an API key"))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Model identifier configured for a kind of request
    pub fn model_for(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Text => &self.config.text_model,
            ModelKind::Vision => &self.config.vision_model,
            ModelKind::Speech => &self.config.tts_model,
        }
    }

    fn endpoint(&self, kind: ModelKind) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.model_for(kind)
        )
    }

    fn build_body(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let system_instruction = request.system_instruction.as_ref().map(|s| WireContent {
            role: None,
            parts: vec![WirePart {
                text: Some(s.clone()),
                inline_data: None,
            }],
        });

        let contents = request.contents.iter().map(to_wire_content).collect();

        let mut generation_config = WireGenerationConfig {
            temperature: request.temperature,
            ..Default::default()
        };
        match &request.response_format {
            ResponseFormat::Text => {}
            ResponseFormat::Json(schema) => {
                generation_config.response_mime_type = Some("application/json".to_string());
                generation_config.response_schema = schema.clone();
            }
            ResponseFormat::Audio => {
                generation_config.response_modalities = Some(vec!["AUDIO".to_string()]);
                generation_config.speech_config = Some(json!({
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.config.tts_voice }
                    }
                }));
            }
        }

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: Some(generation_config),
        }
    }

    /// Send one request, no retry
    async fn send_once(&self, url: &str, request: &GenerationRequest, body: &GenerateContentRequest) -> Result<GenerationResponse> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&request.operation, e))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&request.operation, e))?;

        if !status.is_success() {
            return Err(map_status_error(&request.operation, status, &body_text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body_text).map_err(|e| {
            GatewayError::generation(
                request.operation.clone(),
                format!("parse the provider response: {}", e),
            )
        })?;

        extract_response(&request.operation, parsed)
    }

    fn map_transport_error(&self, operation: &str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            GatewayError::transient(err.status().map(|s| s.as_u16()), err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl GenerativeProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let url = self.endpoint(request.model);
        let body = self.build_body(&request);

        let mut last_error = None;
        let mut backoff_ms = self.config.initial_backoff_ms;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    attempt = attempt,
                    backoff_ms = backoff_ms,
                    operation = %request.operation,
                    "Retrying provider call"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms as f64 * self.config.backoff_multiplier) as u64;
                backoff_ms = backoff_ms.min(self.config.max_backoff_ms);
            }

            match self.send_once(&url, &request, &body).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        error = %e,
                        operation = %request.operation,
                        model = %self.model_for(request.model),
                        "Provider call failed"
                    );
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            GatewayError::transient(None, "provider call did not complete")
        }))
    }
}

fn to_wire_content(content: &Content) -> WireContent {
    WireContent {
        role: Some(content.role.as_str().to_string()),
        parts: content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart {
                    text: Some(text.clone()),
                    inline_data: None,
                },
                Part::InlineData(blob) => WirePart {
                    text: None,
                    inline_data: Some(WireBlob {
                        mime_type: blob.mime_type.clone(),
                        data: STANDARD.encode(&blob.data),
                    }),
                },
            })
            .collect(),
    }
}

fn map_status_error(operation: &str, status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| match env.error.status {
            Some(code) => format!("{}: {}", code, env.error.message),
            None => env.error.message,
        })
        .unwrap_or_else(|_| body.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        GatewayError::transient(Some(status.as_u16()), message)
    } else {
        GatewayError::generation(
            operation,
            format!("generate content: provider rejected the request ({}): {}", status.as_u16(), message),
        )
    }
}

fn extract_response(operation: &str, parsed: GenerateContentResponse) -> Result<GenerationResponse> {
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        tracing::warn!(operation = %operation, reason = %reason, "Provider returned no candidates");
        return Ok(GenerationResponse::default());
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            tracing::debug!(operation = %operation, finish_reason = %reason, "Candidate finished early");
        }
    }

    let mut text: Option<String> = None;
    let mut audio: Option<Blob> = None;
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(t) = part.text {
            text.get_or_insert_with(String::new).push_str(&t);
        }
        if audio.is_some() {
            continue;
        }
        if let Some(blob) = part.inline_data {
            let data = STANDARD.decode(blob.data.as_bytes()).map_err(|e| {
                GatewayError::generation(operation, format!("decode inline audio: {}", e))
            })?;
            audio = Some(Blob {
                mime_type: blob.mime_type,
                data,
            });
        }
    }

    Ok(GenerationResponse { text, audio })
}

/// Builder for GeminiProvider
pub struct GeminiProviderBuilder {
    config: ProviderConfig,
}

impl GeminiProviderBuilder {
    pub fn new() -> Self {
        Self {
            config: ProviderConfig::default(),
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(key.into()));
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.config.timeout_ms = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn initial_backoff_ms(mut self, backoff: u64) -> Self {
        self.config.initial_backoff_ms = backoff;
        self
    }

    pub fn max_backoff_ms(mut self, backoff: u64) -> Self {
        self.config.max_backoff_ms = backoff;
        self
    }

    pub fn tts_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.tts_voice = voice.into();
        self
    }

    pub fn build(self) -> Result<GeminiProvider> {
        GeminiProvider::from_config(&self.config)
    }
}

impl Default for GeminiProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ChatRole;

    fn provider() -> GeminiProvider {
        GeminiProvider::builder()
            .api_key("test-key")
            .base_url("http://localhost:9999/")
            .build()
            .unwrap()
    }

    fn request(format: ResponseFormat) -> GenerationRequest {
        GenerationRequest {
            operation: "test".to_string(),
            model: ModelKind::Text,
            system_instruction: Some("be kind".to_string()),
            contents: vec![
                Content::user(vec![Part::text("A")]),
                Content {
                    role: ChatRole::Model,
                    parts: vec![Part::text("B")],
                },
            ],
            temperature: Some(0.7),
            response_format: format,
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = GeminiProvider::builder().build().err().unwrap();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_endpoint_uses_model_per_kind() {
        let p = provider();
        assert_eq!(
            p.endpoint(ModelKind::Speech),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );
        assert_eq!(p.model_for(ModelKind::Vision), "gemini-2.5-flash");
    }

    #[test]
    fn test_body_shape_for_text() {
        let body = serde_json::to_value(provider().build_body(&request(ResponseFormat::Text))).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be kind");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "B");
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_body_shape_for_audio() {
        let body = serde_json::to_value(provider().build_body(&request(ResponseFormat::Audio))).unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["responseModalities"][0], "AUDIO");
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Algenib"
        );
    }

    #[test]
    fn test_inline_data_is_base64() {
        let content = Content::user(vec![Part::InlineData(Blob {
            mime_type: "video/webm".to_string(),
            data: vec![1, 2, 3],
        })]);
        let wire = serde_json::to_value(to_wire_content(&content)).unwrap();
        assert_eq!(wire["parts"][0]["inlineData"]["mimeType"], "video/webm");
        assert_eq!(wire["parts"][0]["inlineData"]["data"], "AQID");
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_status_error("op", StatusCode::TOO_MANY_REQUESTS, body);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED: quota"));

        let err = map_status_error("op", StatusCode::BAD_REQUEST, "nope");
        assert_eq!(err.error_code(), "GENERATION_ERROR");
        assert!(!err.is_retryable());

        assert!(map_status_error("op", StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
    }

    #[test]
    fn test_extract_joins_text_and_decodes_audio() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Hello "},
                    {"text": "there"},
                    {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAE="}}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        let response = extract_response("op", parsed).unwrap();
        assert_eq!(response.text.as_deref(), Some("Hello there"));
        assert_eq!(response.audio.unwrap().data, vec![0, 1]);
    }

    #[test]
    fn test_blocked_prompt_yields_empty_response() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(extract_response("op", parsed).unwrap().is_empty());
    }
}
