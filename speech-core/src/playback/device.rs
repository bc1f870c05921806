//! Speaker output using cpal. One short-lived audio thread per clip.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use super::decode::{decode_clip, resample_linear, DecodedAudio};
use super::feed::SampleFeed;
use super::{ActivePlayback, AudioClip, AudioOutput, PlaybackControl, PlaybackError};

const INIT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
pub struct CpalOutput;

impl CpalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl AudioOutput for CpalOutput {
    fn start(&self, clip: &AudioClip) -> Result<Arc<dyn ActivePlayback>, PlaybackError> {
        let decoded = decode_clip(clip)?;
        let control = PlaybackControl::new();
        let (init_tx, init_rx) = mpsc::channel();

        let thread_control = Arc::clone(&control);
        let handle = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                if let Err(e) = run_output_thread(decoded, &thread_control, init_tx) {
                    log::error!("Audio output thread failed: {e}");
                    thread_control.fail(e);
                }
            })
            .map_err(|e| {
                log::error!("Failed to spawn audio output thread: {e}");
                PlaybackError::ThreadError
            })?;

        match init_rx.recv_timeout(INIT_TIMEOUT) {
            Ok(Ok(())) => Ok(control),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                control.stop();
                Err(PlaybackError::ThreadError)
            }
        }
    }
}

fn run_output_thread(
    decoded: DecodedAudio,
    control: &Arc<PlaybackControl>,
    init_tx: mpsc::Sender<Result<(), PlaybackError>>,
) -> Result<(), PlaybackError> {
    let stream = match open_stream(decoded, control) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = init_tx.send(Err(e.clone()));
            return Ok(());
        }
    };

    if let Err(e) = stream.play() {
        let err = PlaybackError::Device(e.to_string());
        let _ = init_tx.send(Err(err.clone()));
        return Err(err);
    }

    let _ = init_tx.send(Ok(()));

    // Stream stays alive on this thread until the clip ends or is stopped.
    let _ = control.wait();
    drop(stream);
    Ok(())
}

fn open_stream(
    decoded: DecodedAudio,
    control: &Arc<PlaybackControl>,
) -> Result<cpal::Stream, PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoOutputDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;

    let device_rate = supported.sample_rate().0;
    let samples = resample_linear(&decoded.samples, decoded.sample_rate, device_rate);

    log::debug!(
        "Output: {} Hz, {} channels, {:.2}s clip",
        device_rate,
        supported.channels(),
        decoded.duration_secs()
    );

    let config: cpal::StreamConfig = supported.config();
    match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, control),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, control),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, control),
        _ => return Err(PlaybackError::UnsupportedFormat),
    }
    .map_err(|e| PlaybackError::Device(e.to_string()))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
    control: &Arc<PlaybackControl>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: Sample + SizedSample + FromSample<f32> + Send + 'static,
{
    let channels = usize::from(config.channels);
    let data_control = Arc::clone(control);
    let err_control = Arc::clone(control);
    let mut feed = SampleFeed::new(samples);

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if data_control.is_finished() {
                data.fill(T::EQUILIBRIUM);
                return;
            }
            if feed.fill(data, channels, |value| T::from_sample(value)) {
                data_control.finish();
            }
        },
        move |err: cpal::StreamError| {
            log::error!("Output stream error: {err}");
            err_control.fail(PlaybackError::Device(err.to_string()));
        },
        None,
    )
}

/// Names of the output devices the default host exposes.
pub fn list_output_devices() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices
            .map(|device| device.name().unwrap_or_default())
            .collect(),
        Err(e) => {
            log::error!("Failed to list output devices: {e}");
            Vec::new()
        }
    }
}
