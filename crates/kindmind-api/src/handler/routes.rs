//! Route definitions for the KindMind API
//!
//! - POST /api/v1/accessibility/suggestions
//! - POST /api/v1/speech
//! - POST /api/v1/companion
//! - POST /api/v1/mood
//! - POST /api/v1/sign-language/translate
//! - GET /api/v1/emergency/phrases
//! - GET /api/v1/modes
//! - GET /health
//! - GET /metrics

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use kindmind_core::contracts::{
    AccessibilityProfile, CompanionReply, CompanionRequest, MoodRequest, SentimentResult,
    SignTranslationRequest, SignTranslationResult, SpeechRequest, SpeechResult, UiConfig,
};
use kindmind_core::emergency::EMERGENCY_PHRASES;
use kindmind_core::{Gateway, GatewayAction, GatewayError};

use super::{ActionMode, ApiResponse, EmergencyPhrase, ErrorInfo, HealthResponse};
use crate::telemetry::{self, GatewayMetricsRegistry};

/// Default request body cap; sign-language clips arrive inline as data URIs
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Handler state shared across all routes
#[derive(Clone)]
pub struct HandlerState {
    pub gateway: Arc<Gateway>,
    pub metrics: Arc<GatewayMetricsRegistry>,
    pub start_time: Instant,
    pub max_body_bytes: usize,
}

impl HandlerState {
    pub fn new(gateway: Gateway) -> telemetry::Result<Self> {
        Ok(Self {
            gateway: Arc::new(gateway),
            metrics: Arc::new(GatewayMetricsRegistry::new()?),
            start_time: Instant::now(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// A gateway action failed
    Gateway {
        error: GatewayError,
        request_id: String,
    },
    /// The body could not be read as the expected JSON shape
    Rejected { status: StatusCode, message: String },
    InternalError(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Gateway { error, .. } => error.error_code(),
            ApiError::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            ApiError::Rejected { .. } => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Gateway { error, .. } => match error {
                GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
                GatewayError::Generation { .. } | GatewayError::Translation { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                GatewayError::TransientProvider { .. } => StatusCode::SERVICE_UNAVAILABLE,
                GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Rejected { status, .. } => *status,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // unreadable or mistyped bodies are caller input errors, oversized ones keep 413
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError::Rejected {
            status,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let (error_info, request_id) = match self {
            ApiError::Gateway { error, request_id } => {
                let info = ErrorInfo::new(code, error.to_string());
                let info = match error.failed_step() {
                    Some(step) => info.with_details(serde_json::json!({ "step": step.as_str() })),
                    None => info,
                };
                (info, request_id)
            }
            ApiError::Rejected { message: msg, .. } | ApiError::InternalError(msg) => {
                (ErrorInfo::new(code, msg), uuid::Uuid::new_v4().to_string())
            }
        };

        let response = ApiResponse::<()>::error(error_info, request_id.clone());
        (status, [("X-Request-ID", request_id)], Json(response)).into_response()
    }
}

/// JSON body whose rejections render as the API envelope
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Create the router with all routes
pub fn create_router(state: HandlerState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        // Gateway actions
        .route("/api/v1/accessibility/suggestions", post(accessibility_suggestions))
        .route("/api/v1/speech", post(text_to_speech))
        .route("/api/v1/companion", post(empathetic_response))
        .route("/api/v1/mood", post(mood_insights))
        .route("/api/v1/sign-language/translate", post(sign_language_translation))
        // Static and introspection endpoints
        .route("/api/v1/emergency/phrases", get(emergency_phrases))
        .route("/api/v1/modes", get(modes))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run one gateway action with timing, metrics and logging
async fn run_action<T, F>(
    state: &HandlerState,
    action: GatewayAction,
    call: F,
) -> Result<Json<ApiResponse<T>>, ApiError>
where
    F: Future<Output = kindmind_core::Result<T>>,
{
    let request_id = uuid::Uuid::new_v4().to_string();
    let mode = state.gateway.mode(action);
    let metrics = state.metrics.gateway();
    let timer = metrics.start_timer(action.as_str(), mode.as_str());

    match call.await {
        Ok(data) => {
            let duration_ms = timer.elapsed_ms();
            metrics.record_request(action.as_str(), mode.as_str(), "success");
            tracing::info!(
                request_id = %request_id,
                action = action.name(),
                mode = %mode,
                duration_ms = duration_ms,
                "Gateway action completed"
            );
            Ok(Json(ApiResponse::success(data, request_id).with_duration(duration_ms)))
        }
        Err(error) => {
            let outcome = if error.is_user_error() { "rejected" } else { "failed" };
            metrics.record_request(action.as_str(), mode.as_str(), outcome);
            metrics.record_error(action.as_str(), error.error_code());
            if error.is_user_error() {
                tracing::info!(
                    request_id = %request_id,
                    action = action.name(),
                    error = %error,
                    "Gateway action rejected input"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    action = action.name(),
                    mode = %mode,
                    code = error.error_code(),
                    error = %error,
                    duration_ms = timer.elapsed_ms(),
                    "Gateway action failed"
                );
            }
            Err(ApiError::Gateway { error, request_id })
        }
    }
}

/// POST /api/v1/accessibility/suggestions
pub async fn accessibility_suggestions(
    State(state): State<HandlerState>,
    ApiJson(profile): ApiJson<AccessibilityProfile>,
) -> Result<Json<ApiResponse<UiConfig>>, ApiError> {
    run_action(
        &state,
        GatewayAction::AccessibilitySuggestions,
        state.gateway.get_accessibility_suggestions(&profile),
    )
    .await
}

/// POST /api/v1/speech
pub async fn text_to_speech(
    State(state): State<HandlerState>,
    ApiJson(request): ApiJson<SpeechRequest>,
) -> Result<Json<ApiResponse<SpeechResult>>, ApiError> {
    run_action(
        &state,
        GatewayAction::TextToSpeech,
        state.gateway.get_text_to_speech(&request),
    )
    .await
}

/// POST /api/v1/companion
pub async fn empathetic_response(
    State(state): State<HandlerState>,
    ApiJson(request): ApiJson<CompanionRequest>,
) -> Result<Json<ApiResponse<CompanionReply>>, ApiError> {
    run_action(
        &state,
        GatewayAction::EmpatheticResponse,
        state.gateway.get_empathetic_response(&request),
    )
    .await
}

/// POST /api/v1/mood
pub async fn mood_insights(
    State(state): State<HandlerState>,
    ApiJson(request): ApiJson<MoodRequest>,
) -> Result<Json<ApiResponse<SentimentResult>>, ApiError> {
    run_action(
        &state,
        GatewayAction::MoodInsights,
        state.gateway.get_mood_insights(&request),
    )
    .await
}

/// POST /api/v1/sign-language/translate
pub async fn sign_language_translation(
    State(state): State<HandlerState>,
    ApiJson(request): ApiJson<SignTranslationRequest>,
) -> Result<Json<ApiResponse<SignTranslationResult>>, ApiError> {
    run_action(
        &state,
        GatewayAction::SignLanguageTranslation,
        state.gateway.get_sign_language_translation(&request),
    )
    .await
}

/// GET /api/v1/emergency/phrases
pub async fn emergency_phrases() -> Json<ApiResponse<Vec<EmergencyPhrase>>> {
    let phrases = EMERGENCY_PHRASES
        .iter()
        .enumerate()
        .map(|(index, text)| EmergencyPhrase {
            index,
            text: text.to_string(),
        })
        .collect();
    Json(ApiResponse::success(phrases, uuid::Uuid::new_v4().to_string()))
}

/// GET /api/v1/modes
pub async fn modes(State(state): State<HandlerState>) -> Json<ApiResponse<Vec<ActionMode>>> {
    let modes = ActionMode::list(&state.gateway.modes());
    Json(ApiResponse::success(modes, uuid::Uuid::new_v4().to_string()))
}

/// GET /health
pub async fn health_check(State(state): State<HandlerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        modes: ActionMode::list(&state.gateway.modes()),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<HandlerState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .encode_text()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindmind_core::TranslationStep;

    fn gateway_error(error: GatewayError) -> ApiError {
        ApiError::Gateway {
            error,
            request_id: "req".to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                GatewayError::generation("analyzeSentiment", "analyze sentiment."),
                StatusCode::BAD_GATEWAY,
            ),
            (
                GatewayError::translation(
                    TranslationStep::Speak,
                    GatewayError::generation("generateSpeech", "generate speech from text."),
                ),
                StatusCode::BAD_GATEWAY,
            ),
            (GatewayError::transient(Some(429), "quota"), StatusCode::SERVICE_UNAVAILABLE),
            (
                GatewayError::Timeout {
                    operation: "generateSpeech".to_string(),
                    timeout_ms: 10,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (GatewayError::config("no key"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(gateway_error(error).status_code(), status);
        }
    }

    #[test]
    fn test_rejection_codes() {
        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "missing field `text`".to_string(),
        };
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        };
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[test]
    fn test_handler_state_defaults() {
        let state = HandlerState::new(Gateway::mock()).unwrap();
        assert_eq!(state.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(state.with_body_limit(1024).max_body_bytes, 1024);
    }
}
