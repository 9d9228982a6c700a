use crate::audio::Audio;
use anyhow::{Context, Result, anyhow};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Loads a WAV file into planar f32 channels. Integer formats up to 32 bits
/// and 32-bit float are accepted; everything is normalized to [-1.0, 1.0].
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<Audio> {
    let path = path.as_ref();
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to open WAV file {:?}", path))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(anyhow!("WAV file {:?} reports 0 channels", path));
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to decode float samples from {:?}", path))?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(anyhow!(
                    "Unsupported bit depth {} in {:?}",
                    spec.bits_per_sample,
                    path
                ));
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .with_context(|| format!("Failed to decode integer samples from {:?}", path))?
        }
    };

    let n_channels = spec.channels as usize;
    if samples.len() % n_channels != 0 {
        return Err(anyhow!(
            "Sample count {} is not divisible by channel count {} for file {:?}",
            samples.len(),
            n_channels,
            path
        ));
    }

    let channels = deinterleave(&samples, n_channels);
    Audio::new(spec.sample_rate, channels)
        .map_err(|e| anyhow!("Inconsistent channel data in {:?}: {}", path, e))
}

/// Saves audio as 16-bit PCM WAV, interleaving the planar channels.
pub fn save_wav<P: AsRef<Path>>(audio: &Audio, path: P) -> Result<()> {
    let path = path.as_ref();
    if audio.channel_count() == 0 {
        return Err(anyhow!("Refusing to write WAV with 0 channels"));
    }

    let spec = WavSpec {
        channels: audio.channel_count() as u16,
        sample_rate: audio.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file {:?}", path))?;

    for sample in audio.interleaved() {
        // Clamp to [-1.0, 1.0] before scaling to i16
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file {:?}", path))?;
    Ok(())
}

fn deinterleave(samples: &[f32], n_channels: usize) -> Vec<Vec<f32>> {
    let n_frames = samples.len() / n_channels;
    let mut channels = vec![Vec::with_capacity(n_frames); n_channels];
    for frame in samples.chunks_exact(n_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    channels
}
