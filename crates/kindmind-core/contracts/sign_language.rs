//! Sign-language video translation contract

use serde::{Deserialize, Serialize};

use super::Validate;
use crate::error::{GatewayError, Result};
use crate::media::DataUri;

/// Emotion label used when the model does not report one
pub const DEFAULT_EMOTION: &str = "neutral";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTranslationRequest {
    /// `data:<video mime>;base64,<clip>`
    pub video_data_uri: String,
}

impl SignTranslationRequest {
    pub fn new(video_data_uri: impl Into<String>) -> Self {
        Self {
            video_data_uri: video_data_uri.into(),
        }
    }

    /// Decode the clip; malformed URIs are a validation error
    pub fn video(&self) -> Result<DataUri> {
        let uri = DataUri::parse(&self.video_data_uri)?;
        if uri.data().is_empty() {
            return Err(GatewayError::validation("videoDataUri carries no video data"));
        }
        Ok(uri)
    }
}

impl Validate for SignTranslationRequest {
    fn validate(&self) -> Result<()> {
        self.video().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTranslationResult {
    pub translated_text: String,
    pub translated_speech_uri: String,
    /// Always present, in [0, 1], even when low
    pub confidence_score: f64,
    pub emotion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_name() {
        let req: SignTranslationRequest =
            serde_json::from_str(r#"{"videoDataUri":"data:video/webm;base64,GkXfow=="}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.video().unwrap().mime_type(), "video/webm");
    }

    #[test]
    fn test_malformed_uri_is_validation_error() {
        let err = SignTranslationRequest::new("not a uri").validate().unwrap_err();
        assert!(err.is_user_error());
        let err = SignTranslationRequest::new("data:video/webm;base64,").validate().unwrap_err();
        assert!(err.is_user_error());
    }
}
