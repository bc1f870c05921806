use std::io::Cursor;
use std::time::Instant;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioClip, PlaybackError};

/// Mono PCM ready for an output device.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decodes a clip to mono f32 samples. Corrupt packets are skipped; a clip
/// that yields no samples is an error.
pub fn decode_clip(clip: &AudioClip) -> Result<DecodedAudio, PlaybackError> {
    let start = Instant::now();
    let source = Cursor::new(clip.shared_bytes());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    if !clip.extension().is_empty() {
        hint.with_extension(clip.extension());
    }

    let fmt_opts: FormatOptions = Default::default();
    let meta_opts: MetadataOptions = Default::default();
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| {
            PlaybackError::Decode(format!(
                "failed to probe {}/{}: {e}",
                clip.language(),
                clip.word_id()
            ))
        })?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| PlaybackError::Decode("missing default track".to_string()))?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Decode(format!("decoder init failed: {e}")))?;

    let track_id = track.id;
    let mut pcm = track
        .codec_params
        .n_frames
        .and_then(|n| usize::try_from(n).ok())
        .map(Vec::with_capacity)
        .unwrap_or_default();
    let mut sample_rate = track.codec_params.sample_rate;

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = sample_rate.or(Some(spec.rate));
                let channels = spec.channels.count();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);

                if channels <= 1 {
                    pcm.extend_from_slice(buf.samples());
                } else {
                    for frame in buf.samples().chunks_exact(channels) {
                        let sum: f32 = frame.iter().copied().sum();
                        pcm.push(sum / channels as f32);
                    }
                }
            }
            Err(err) if matches!(err, SymphoniaError::DecodeError(_)) => {
                log::warn!("skipping corrupt packet in {}: {err}", clip.word_id());
                continue;
            }
            Err(err) => {
                return Err(PlaybackError::Decode(format!(
                    "decode error for {}/{}: {err}",
                    clip.language(),
                    clip.word_id()
                )));
            }
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| {
        PlaybackError::Decode(format!("missing sample rate for {}", clip.word_id()))
    })?;

    if pcm.is_empty() {
        return Err(PlaybackError::EmptyClip);
    }

    log::debug!(
        "Decoded {}/{}: {} samples at {} Hz in {:?}",
        clip.language(),
        clip.word_id(),
        pcm.len(),
        sample_rate,
        start.elapsed()
    );

    Ok(DecodedAudio {
        samples: pcm,
        sample_rate,
    })
}

pub fn resample_linear(input: &[f32], from_sr: u32, to_sr: u32) -> Vec<f32> {
    if from_sr == 0 || to_sr == 0 || input.is_empty() {
        return Vec::new();
    }
    if from_sr == to_sr {
        return input.to_vec();
    }

    let out_len = ((input.len() as f64) * (to_sr as f64) / (from_sr as f64))
        .ceil()
        .max(1.0) as usize;
    let step = from_sr as f64 / to_sr as f64;

    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = (i as f64) * step;
        let idx = pos.floor() as usize;
        let frac = pos - idx as f64;

        let current = input.get(idx).copied().unwrap_or_default();
        let next = input.get(idx + 1).copied().unwrap_or(current);
        output.push(current + (next - current) * (frac as f32));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_empty_input() {
        assert!(resample_linear(&[], 24000, 48000).is_empty());
    }

    #[test]
    fn resample_zero_rates() {
        let input = vec![1.0, 2.0, 3.0];
        assert!(resample_linear(&input, 0, 48000).is_empty());
        assert!(resample_linear(&input, 24000, 0).is_empty());
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&input, 44100, 44100), input);
    }

    #[test]
    fn resample_upsample_doubles_length() {
        // 2 samples at 24kHz -> 4 samples at 48kHz
        let result = resample_linear(&[0.0, 1.0], 24000, 48000);
        assert_eq!(result.len(), 4);
        assert!((result[1] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let clip = AudioClip::new(crate::Language::En, "hi", "mp3", vec![0u8; 16]);
        assert!(decode_clip(&clip).is_err());
    }
}
