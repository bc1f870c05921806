//! Hands decoded samples to the device callback and tracks when the clip has
//! drained out of the device buffers.
#![cfg_attr(not(feature = "device-output"), allow(dead_code))]

/// Silent buffers requested after the last sample before the tail has played.
pub(crate) const DRAIN_CALLBACKS: u8 = 2;

pub(crate) struct SampleFeed {
    samples: Vec<f32>,
    cursor: usize,
    silent_callbacks: u8,
}

impl SampleFeed {
    pub(crate) fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            cursor: 0,
            silent_callbacks: 0,
        }
    }

    /// Fills one interleaved device buffer, duplicating each mono sample
    /// across `channels`. Returns `true` once the clip has been written and
    /// `DRAIN_CALLBACKS` silent buffers have followed it.
    pub(crate) fn fill<T: Copy>(
        &mut self,
        data: &mut [T],
        channels: usize,
        convert: impl Fn(f32) -> T,
    ) -> bool {
        let had_samples = self.cursor < self.samples.len();
        for frame in data.chunks_mut(channels.max(1)) {
            let value = match self.samples.get(self.cursor) {
                Some(&sample) => {
                    self.cursor += 1;
                    sample
                }
                None => 0.0,
            };
            let sample = convert(value);
            for out in frame.iter_mut() {
                *out = sample;
            }
        }

        if !had_samples {
            self.silent_callbacks = self.silent_callbacks.saturating_add(1);
        }
        self.silent_callbacks >= DRAIN_CALLBACKS
    }
}
