//! `data:<mime>;base64,<payload>` codec
//!
//! Input video and output audio both travel as self-describing data URIs.
//! A URI without a MIME type, without the `;base64` marker, or with a payload
//! that is not valid standard base64 is a caller error.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{GatewayError, Result};

fn mime_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]*/[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]*(;[^;]+)*$")
            .expect("static MIME pattern")
    })
}

/// Decoded data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    data: Vec<u8>,
}

impl DataUri {
    /// Build a data URI from raw bytes
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime_pattern().is_match(&mime_type) {
            return Err(GatewayError::validation(format!(
                "invalid MIME type '{}'",
                mime_type
            )));
        }
        Ok(Self { mime_type, data })
    }

    /// Parse `data:<mime>;base64,<payload>`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| GatewayError::validation("data URI must start with 'data:'"))?;

        // base64 has no commas, so the last one ends the header (`codecs=vp8,opus`)
        let (header, payload) = rest
            .rsplit_once(',')
            .ok_or_else(|| GatewayError::validation("data URI is missing the ',' separator"))?;

        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| GatewayError::validation("data URI must use base64 encoding"))?;

        if mime_type.is_empty() {
            return Err(GatewayError::validation("data URI must declare a MIME type"));
        }

        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| GatewayError::validation(format!("data URI payload is not valid base64: {}", e)))?;

        Self::new(mime_type, data)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// MIME type without parameters (`audio/L16;rate=24000` -> `audio/L16`)
    pub fn essence(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or(&self.mime_type)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Base64 payload without the header
    pub fn payload_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload_base64())
    }
}

impl FromStr for DataUri {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_uri() {
        let uri = DataUri::parse("data:video/webm;base64,AAECAw==").unwrap();
        assert_eq!(uri.mime_type(), "video/webm");
        assert_eq!(uri.data(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_display_matches_input() {
        let text = "data:audio/wav;base64,UklGRg==";
        let uri: DataUri = text.parse().unwrap();
        assert_eq!(uri.to_string(), text);
    }

    #[test]
    fn test_mime_parameters_are_kept() {
        let uri = DataUri::parse("data:audio/L16;codec=pcm;rate=24000;base64,AAA=").unwrap();
        assert_eq!(uri.mime_type(), "audio/L16;codec=pcm;rate=24000");
        assert_eq!(uri.essence(), "audio/L16");
    }

    #[test]
    fn test_codecs_list_with_comma() {
        let uri = DataUri::parse("data:video/webm;codecs=vp8,opus;base64,GkXfow==").unwrap();
        assert_eq!(uri.mime_type(), "video/webm;codecs=vp8,opus");
        assert_eq!(uri.essence(), "video/webm");
        assert_eq!(uri.data(), &[0x1a, 0x45, 0xdf, 0xa3]);
    }

    #[test]
    fn test_rejects_missing_mime() {
        let err = DataUri::parse("data:;base64,AAAA").unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_rejects_non_base64_encoding() {
        assert!(DataUri::parse("data:text/plain,hello").is_err());
        assert!(DataUri::parse("data:video/mp4;base64,@@not base64@@").is_err());
        assert!(DataUri::parse("video/mp4;base64,AAAA").is_err());
    }

    #[test]
    fn test_empty_payload_is_well_formed() {
        let uri = DataUri::parse("data:video/mp4;base64,").unwrap();
        assert!(uri.data().is_empty());
    }
}
