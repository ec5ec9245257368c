//! Media codecs: data URIs and WAV framing

pub mod data_uri;
pub mod wav;

pub use data_uri::DataUri;
pub use wav::{decode_wav, encode_wav, PcmFormat, WAV_HEADER_LEN, WAV_MIME};

use crate::error::Result;

/// Frame raw speech PCM and return it as a playable `audio/wav` data URI
pub fn speech_data_uri(pcm: &[u8]) -> Result<DataUri> {
    let wav = encode_wav(pcm, PcmFormat::SPEECH)?;
    DataUri::new(WAV_MIME, wav)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_data_uri_is_wav() {
        let uri = speech_data_uri(&[0, 0, 1, 0]).unwrap();
        assert_eq!(uri.mime_type(), "audio/wav");
        assert!(uri.to_string().starts_with("data:audio/wav;base64,UklGR"));
        assert_eq!(uri.data().len(), WAV_HEADER_LEN + 4);
    }
}
