//! HTTP handlers for the KindMind gateway
//!
//! Every gateway action is exposed as a JSON endpoint and every response,
//! successful or not, is wrapped in the same [`ApiResponse`] envelope so the
//! UI can branch on `success` and fall back to its own calm message.
//!
//! - `routes` - route table, handler state and error mapping

pub mod routes;

pub use routes::{create_router, ApiError, HandlerState};

use kindmind_core::{GatewayAction, GatewayModes, SourceMode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub metadata: ResponseMetadata,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, request_id: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: ResponseMetadata::new(request_id),
        }
    }

    /// Create an error response
    pub fn error(error: ErrorInfo, request_id: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
            metadata: ResponseMetadata::new(request_id),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }
}

/// Error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable code for programmatic handling
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Response metadata for tracing and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    /// RFC 3339
    pub timestamp: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ResponseMetadata {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            duration_ms: None,
        }
    }
}

/// Mode currently serving one action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionMode {
    pub action: String,
    pub mode: SourceMode,
}

impl ActionMode {
    /// One entry per action, in declaration order
    pub fn list(modes: &GatewayModes) -> Vec<ActionMode> {
        GatewayAction::ALL
            .iter()
            .map(|action| ActionMode {
                action: action.name().to_string(),
                mode: modes.get(*action),
            })
            .collect()
    }
}

/// A speakable emergency phrase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyPhrase {
    pub index: usize,
    pub text: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub modes: Vec<ActionMode>,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serializes_camel_case_metadata() {
        let response = ApiResponse::success("ok", "req-1".to_string()).with_duration(12);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["metadata"]["requestId"], "req-1");
        assert_eq!(value["metadata"]["durationMs"], 12);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let response = ApiResponse::<()>::error(
            ErrorInfo::new("VALIDATION_ERROR", "Invalid input: empty"),
            "req-2".to_string(),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
        assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
        assert!(value["metadata"].get("durationMs").is_none());
    }

    #[test]
    fn test_action_mode_list_covers_every_action() {
        let mut modes = GatewayModes::default();
        modes.set(GatewayAction::MoodInsights, SourceMode::Live);

        let list = ActionMode::list(&modes);
        assert_eq!(list.len(), GatewayAction::ALL.len());
        assert_eq!(list[3].action, "getMoodInsights");
        assert_eq!(list[3].mode, SourceMode::Live);
        assert_eq!(list[0].mode, SourceMode::Mock);
    }
}
