use crate::engine::AacEngine;

pub fn run_startup_checks(engine: &AacEngine) {
    log::info!("=== Startup Diagnostics ===");
    check_audio_devices();
    check_synthesizer(engine);
    check_audio_source(engine);
    check_associations(engine);
    log::info!("===========================");
}

#[cfg(feature = "device-output")]
fn check_audio_devices() {
    use cpal::traits::{DeviceTrait, HostTrait};

    let host = cpal::default_host();
    log::info!("Audio Host: {:?}", host.id());

    match host.default_output_device() {
        Some(device) => {
            log::info!(
                "Default Output Device: {}",
                device.name().unwrap_or_default()
            );
            if let Ok(config) = device.default_output_config() {
                log::info!("  Default Config: {:?}", config);
            }
        }
        None => log::error!("No default output device found! Every word will be synthesized."),
    }

    log::info!("Available Output Devices:");
    for (i, name) in crate::playback::list_output_devices().iter().enumerate() {
        log::info!("  {}. {}", i + 1, name);
    }
}

#[cfg(not(feature = "device-output"))]
fn check_audio_devices() {
    log::warn!("Built without device output; recorded words cannot play and will be synthesized.");
}

fn check_synthesizer(engine: &AacEngine) {
    let synthesizer = engine.speech().synthesizer();
    if synthesizer.is_available() {
        log::info!("Speech synthesizer: {}", synthesizer.name());
    } else {
        log::warn!("No speech synthesizer; words without a recording will be silent.");
    }
}

fn check_audio_source(engine: &AacEngine) {
    let cache = engine.speech().cache();
    log::info!(
        "Audio source: {} ({} cached, {} in flight)",
        cache.source(),
        cache.len(),
        cache.in_flight()
    );
}

fn check_associations(engine: &AacEngine) {
    let dangling = engine
        .suggestions()
        .table()
        .dangling_references(engine.vocabulary());
    if dangling.is_empty() {
        return;
    }
    log::info!(
        "{} association targets are not on the board and will never be suggested:",
        dangling.len()
    );
    for (from, to) in dangling {
        log::debug!("  {from} -> {to}");
    }
}
