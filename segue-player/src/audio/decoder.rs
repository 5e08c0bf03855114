//! Audio decoder using symphonia
//!
//! Decodes fetched bytes (MP3, FLAC, AAC, Vorbis, WAV) to interleaved f32 PCM.
//! Decoding is CPU-bound; async callers run it on the blocking pool.

use crate::audio::types::DecodedBuffer;
use crate::error::LoadError;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Whole-buffer audio decoder.
pub struct SimpleDecoder;

impl SimpleDecoder {
    /// Decode an entire in-memory file.
    ///
    /// `extension` is a format hint taken from the URL path, if any.
    ///
    /// # Errors
    /// Every failure is `UnsupportedFormat`: the bytes are already here, so
    /// nothing about retrying would help.
    pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedBuffer, LoadError> {
        debug!("Decoding {} bytes (hint: {:?})", bytes.len(), extension);

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| LoadError::unsupported_format(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LoadError::unsupported_format("No audio track found"))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| LoadError::unsupported_format("Sample rate not found"))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::unsupported_format(format!("Failed to create decoder: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();
        let mut channels = codec_params.channels.map(|c| c.count() as u16);
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    channels.get_or_insert(spec.channels.count() as u16);

                    let buf = sample_buf.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                    });
                    if buf.capacity() < decoded.capacity() * spec.channels.count() {
                        *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    }
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt packet; skip it
                    warn!("Decode error: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(LoadError::unsupported_format(format!("Decoder failed: {}", e)));
                }
            }
        }

        let channels = channels.ok_or_else(|| LoadError::unsupported_format("Channel count not found"))?;

        if samples.is_empty() {
            return Err(LoadError::unsupported_format("Stream contained no audio"));
        }

        debug!(
            "Decoded {} frames at {} Hz, {} channel(s)",
            samples.len() / channels.max(1) as usize,
            sample_rate,
            channels
        );

        Ok(DecodedBuffer::new(samples, sample_rate, channels))
    }

    /// File extension of a URL path, used as a format hint
    pub fn extension_hint(url: &str) -> Option<&str> {
        let path = url.split(['?', '#']).next()?;
        let file = path.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 {
            None
        } else {
            Some(ext)
        }
    }
}
