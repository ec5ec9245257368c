//! Turning provider audio into a playable data URI

use crate::error::Result;
use crate::media::{decode_wav, encode_wav, DataUri, PcmFormat, WAV_MIME};
use crate::provider::Blob;

/// Read the sample rate from an `audio/L16;codec=pcm;rate=24000` style MIME type
pub fn pcm_format_for(mime_type: &str) -> PcmFormat {
    let sample_rate = mime_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(PcmFormat::SPEECH.sample_rate);

    PcmFormat {
        sample_rate,
        ..PcmFormat::SPEECH
    }
}

/// Frame raw PCM as WAV; audio already in a WAV container is re-framed as-is
pub fn audio_data_uri(blob: Blob) -> Result<DataUri> {
    let essence = blob.mime_type.split(';').next().unwrap_or_default().trim();
    let wav = if essence.eq_ignore_ascii_case(WAV_MIME) || essence.eq_ignore_ascii_case("audio/x-wav") {
        let (format, pcm) = decode_wav(&blob.data)?;
        encode_wav(&pcm, format)?
    } else {
        encode_wav(&blob.data, pcm_format_for(&blob.mime_type))?
    };
    DataUri::new(WAV_MIME, wav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::WAV_HEADER_LEN;

    #[test]
    fn test_rate_from_mime() {
        assert_eq!(pcm_format_for("audio/L16;codec=pcm;rate=16000").sample_rate, 16_000);
        assert_eq!(pcm_format_for("audio/L16").sample_rate, 24_000);
        assert_eq!(pcm_format_for("audio/L16; rate=abc").sample_rate, 24_000);
    }

    #[test]
    fn test_pcm_is_framed() {
        let uri = audio_data_uri(Blob {
            mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
            data: vec![0u8; 480],
        })
        .unwrap();
        assert_eq!(uri.mime_type(), "audio/wav");
        assert_eq!(uri.data().len(), WAV_HEADER_LEN + 480);
    }

    #[test]
    fn test_wav_input_is_not_double_wrapped() {
        let wav = encode_wav(&[1, 0, 2, 0], PcmFormat::SPEECH).unwrap();
        let uri = audio_data_uri(Blob {
            mime_type: "audio/wav".to_string(),
            data: wav.clone(),
        })
        .unwrap();
        assert_eq!(uri.data(), wav.as_slice());
    }
}
