//! Error types for the KindMind gateway
//!
//! Every failure the core can produce is one of these variants. Callers
//! (the HTTP layer, the CLI) map them to status codes and exit codes, and
//! the UI substitutes its own calm fallback text; the core only has to fail
//! with a distinguishable kind.

use std::fmt;
use thiserror::Error;

/// Step of the translate-then-speak pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStep {
    /// Multimodal video-to-text call
    Translate,
    /// Speech synthesis of the translated text
    Speak,
}

impl TranslationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStep::Translate => "translate",
            TranslationStep::Speak => "speak",
        }
    }
}

impl fmt::Display for TranslationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Input does not satisfy the declared shape; detected before any provider call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Provider answered but the payload was missing or did not match the output shape
    #[error("Failed to {reason}")]
    Generation { operation: String, reason: String },

    /// Composite failure of the sign-language pipeline
    #[error("Sign language translation failed during {step} step: {source}")]
    Translation {
        step: TranslationStep,
        #[source]
        source: Box<GatewayError>,
    },

    /// Rate limiting, 5xx or network failure; eligible for bounded retry
    #[error("Provider temporarily unavailable{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    TransientProvider { status: Option<u16>, message: String },

    /// Provider call exceeded its deadline
    #[error("Operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Invalid start-up configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        GatewayError::Validation(msg.into())
    }

    /// Create a generation error; `reason` completes the sentence "Failed to ..."
    pub fn generation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Generation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        GatewayError::Config(msg.into())
    }

    /// Wrap an error as a failure of one translation step
    pub fn translation(step: TranslationStep, source: GatewayError) -> Self {
        GatewayError::Translation {
            step,
            source: Box::new(source),
        }
    }

    /// Create a transient provider error
    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::TransientProvider {
            status,
            message: message.into(),
        }
    }

    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::Generation { .. } => "GENERATION_ERROR",
            GatewayError::Translation { .. } => "TRANSLATION_ERROR",
            GatewayError::TransientProvider { .. } => "PROVIDER_UNAVAILABLE",
            GatewayError::Timeout { .. } => "PROVIDER_TIMEOUT",
            GatewayError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether a retry with backoff may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::TransientProvider { .. })
    }

    /// Check if the caller supplied bad input (vs provider or internal failure)
    pub fn is_user_error(&self) -> bool {
        matches!(self, GatewayError::Validation(_))
    }

    /// Translation step that failed, if this is a translation error
    pub fn failed_step(&self) -> Option<TranslationStep> {
        match self {
            GatewayError::Translation { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Validation(format!("JSON error: {}", err))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_message_reads_failed_to() {
        let err = GatewayError::generation("translateSignLanguage", "translate sign language.");
        assert_eq!(err.to_string(), "Failed to translate sign language.");
        assert_eq!(err.error_code(), "GENERATION_ERROR");
    }

    #[test]
    fn test_translation_error_names_step() {
        let inner = GatewayError::generation("generateSpeech", "generate speech from text.");
        let err = GatewayError::translation(TranslationStep::Speak, inner);
        assert_eq!(err.failed_step(), Some(TranslationStep::Speak));
        assert!(err.to_string().contains("speak step"));
        assert!(err.to_string().contains("Failed to generate speech from text."));
    }

    #[test]
    fn test_transient_display() {
        let err = GatewayError::transient(Some(429), "rate limited");
        assert_eq!(err.to_string(), "Provider temporarily unavailable (429): rate limited");
        assert!(err.is_retryable());

        let err = GatewayError::transient(None, "connection reset");
        assert_eq!(err.to_string(), "Provider temporarily unavailable: connection reset");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(GatewayError::validation("bad").is_user_error());
        assert!(!GatewayError::config("bad").is_user_error());
        assert!(!GatewayError::generation("op", "x").is_retryable());
        assert!(!GatewayError::Timeout {
            operation: "op".to_string(),
            timeout_ms: 10
        }
        .is_retryable());
    }
}
