use std::io::Cursor;

use norah_speech_lib::playback::{decode_clip, resample_linear, AudioClip, PlaybackError};
use norah_speech_lib::vocabulary::Language;

fn wav_bytes(channels: u16, sample_rate: u32, frames: &[&[i16]]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for frame in frames {
            for &sample in *frame {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn decodes_mono_wav() {
    let frames: Vec<[i16; 1]> = (0..800).map(|i| [(i % 100) as i16 * 100]).collect();
    let frames: Vec<&[i16]> = frames.iter().map(|f| f.as_slice()).collect();
    let clip = AudioClip::new(Language::En, "hi", "wav", wav_bytes(1, 8000, &frames));

    let decoded = decode_clip(&clip).unwrap();
    assert_eq!(decoded.sample_rate, 8000);
    assert_eq!(decoded.samples.len(), 800);
    assert!((decoded.duration_secs() - 0.1).abs() < 1e-3);
}

#[test]
fn stereo_is_downmixed() {
    let frame: &[i16] = &[16384, -16384];
    let frames = vec![frame; 400];
    let clip = AudioClip::new(Language::Fr, "salut", "wav", wav_bytes(2, 16000, &frames));

    let decoded = decode_clip(&clip).unwrap();
    assert_eq!(decoded.samples.len(), 400);
    assert!(decoded.samples.iter().all(|s| s.abs() < 1e-3));
}

#[test]
fn header_only_wav_is_empty() {
    let clip = AudioClip::new(Language::En, "hi", "wav", wav_bytes(1, 8000, &[]));
    assert!(decode_clip(&clip).is_err());
}

#[test]
fn truncated_clip_fails_to_decode() {
    let clip = AudioClip::new(Language::En, "hi", "mp3", b"ID3".to_vec());
    assert!(matches!(
        decode_clip(&clip),
        Err(PlaybackError::Decode(_)) | Err(PlaybackError::EmptyClip)
    ));
}

#[test]
fn decoded_audio_resamples_to_device_rate() {
    let frames: Vec<[i16; 1]> = (0..160).map(|_| [1000]).collect();
    let frames: Vec<&[i16]> = frames.iter().map(|f| f.as_slice()).collect();
    let clip = AudioClip::new(Language::En, "yes", "wav", wav_bytes(1, 8000, &frames));

    let decoded = decode_clip(&clip).unwrap();
    let resampled = resample_linear(&decoded.samples, decoded.sample_rate, 48000);
    assert_eq!(resampled.len(), 960);
}
