use crate::error::PsolaError;

/// Planar multi-channel audio: one sample vector per channel, all the same
/// length, tagged with the sample rate it was captured at.
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Audio {
    /// Builds a buffer from planar channel data. All channels must have the
    /// same length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, PsolaError> {
        if let Some(first) = channels.first() {
            let expected = first.len();
            for channel in &channels[1..] {
                if channel.len() != expected {
                    return Err(PsolaError::ChannelLengthMismatch {
                        expected,
                        actual: channel.len(),
                    });
                }
            }
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Wraps a single channel of samples.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |channel| channel.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Samples of one channel. Panics if `index` is out of range.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Averages all channels into a single one. A buffer that is already
    /// mono (or has no channels) is returned unchanged.
    pub fn to_mono(&self) -> Audio {
        if self.channel_count() <= 1 {
            return self.clone();
        }
        let scale = 1.0 / self.channel_count() as f32;
        let mut mixed = vec![0.0; self.len()];
        for channel in &self.channels {
            for (acc, &sample) in mixed.iter_mut().zip(channel) {
                *acc += sample * scale;
            }
        }
        Audio {
            sample_rate: self.sample_rate,
            channels: vec![mixed],
        }
    }

    /// Returns the samples interleaved as
    /// `[ch0_f0, ch1_f0, ..., ch0_f1, ch1_f1, ...]`.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * self.channel_count());
        for frame in 0..self.len() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// RMS level of one channel; 0.0 for an empty channel. Panics if
    /// `channel` is out of range.
    pub fn rms(&self, channel: usize) -> f32 {
        let samples = &self.channels[channel];
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }
}
