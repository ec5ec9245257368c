//! WAV framing for raw PCM returned by the speech model
//!
//! The provider returns headerless little-endian 16-bit PCM. Browsers need a
//! container, so the samples are wrapped in a canonical RIFF/WAVE file. The
//! framing is lossless: N PCM bytes become exactly `WAV_HEADER_LEN + N` bytes.

use std::io::Cursor;

use crate::error::{GatewayError, Result};

/// Canonical PCM WAVE header: RIFF (12) + fmt chunk (24) + data chunk header (8)
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type emitted for framed audio
pub const WAV_MIME: &str = "audio/wav";

/// PCM sample layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// Layout produced by the speech model: mono, 24 kHz, 16-bit
    pub const SPEECH: PcmFormat = PcmFormat {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
    };

    fn bytes_per_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    fn spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// Wrap raw little-endian 16-bit PCM in a WAV container
pub fn encode_wav(pcm: &[u8], format: PcmFormat) -> Result<Vec<u8>> {
    if format.bits_per_sample != 16 {
        return Err(GatewayError::generation(
            "generateSpeech",
            format!("encode audio: unsupported sample width {} bits", format.bits_per_sample),
        ));
    }
    if pcm.len() % format.bytes_per_frame() != 0 {
        return Err(GatewayError::generation(
            "generateSpeech",
            format!(
                "encode audio: {} PCM bytes is not a whole number of {}-byte frames",
                pcm.len(),
                format.bytes_per_frame()
            ),
        ));
    }

    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + pcm.len()));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, format.spec()).map_err(wav_error)?;
        for chunk in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
                .map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    Ok(cursor.into_inner())
}

/// Read a WAV container back into its format and raw little-endian PCM bytes
pub fn decode_wav(wav: &[u8]) -> Result<(PcmFormat, Vec<u8>)> {
    let mut reader = hound::WavReader::new(Cursor::new(wav)).map_err(wav_error)?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(GatewayError::generation(
            "generateSpeech",
            format!("decode audio: expected 16-bit integer PCM, got {} bits", spec.bits_per_sample),
        ));
    }

    let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        pcm.extend_from_slice(&sample.map_err(wav_error)?.to_le_bytes());
    }

    let format = PcmFormat {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
    };
    Ok((format, pcm))
}

fn wav_error(err: hound::Error) -> GatewayError {
    GatewayError::generation("generateSpeech", format!("encode audio: {}", err))
}
