//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use crate::matcher::AudioTrack;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::IntoSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::warn;

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels in the source before downmixing.
    pub source_channels: usize,
    /// Duration in seconds.
    pub duration_secs: f32,
}

impl DecodedAudio {
    /// Convert into a track for matching.
    pub fn into_track(self) -> AudioTrack {
        AudioTrack::new(self.samples, self.sample_rate)
    }
}

/// Decode an audio file to mono f32 samples.
///
/// Supports WAV, FLAC, MP3, AAC and Ogg Vorbis. Multi-channel audio is
/// averaged down to mono.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(symphonia::core::errors::Error::ResetRequired) => break,
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_samples(&decoded, channels, &mut samples),
            // Corrupt frames are common in MP3 streams; skip them
            Err(symphonia::core::errors::Error::DecodeError(reason)) => {
                warn!("Skipping undecodable packet in {}: {reason}", path.display());
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let duration_secs = samples.len() as f32 / sample_rate as f32;

    Ok(DecodedAudio {
        samples,
        sample_rate,
        source_channels: channels,
        duration_secs,
    })
}

/// Append decoded samples to the output buffer, converting to mono.
fn append_samples(buffer: &AudioBufferRef, channels: usize, output: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::U8(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::U16(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::U24(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::U32(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::S8(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::S16(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::S24(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::S32(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::F32(buf) => mix_to_mono(buf, channels, output),
        AudioBufferRef::F64(buf) => mix_to_mono(buf, channels, output),
    }
}

/// Average all channels of a buffer into mono f32.
fn mix_to_mono<S>(buf: &AudioBuffer<S>, channels: usize, output: &mut Vec<f32>)
where
    S: Sample + IntoSample<f32>,
{
    let channels = channels.clamp(1, buf.spec().channels.count().max(1));
    if channels == 1 {
        output.extend(buf.chan(0).iter().map(|&s| -> f32 { s.into_sample() }));
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    for i in 0..buf.frames() {
        let sum: f32 = (0..channels)
            .map(|ch| -> f32 { buf.chan(ch)[i].into_sample() })
            .sum();
        output.push(sum * scale);
    }
}
