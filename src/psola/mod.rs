use crate::audio::Audio;
use crate::error::PsolaError;
use rayon::prelude::*;
use tracing::debug;

mod marks;
mod periodicity;
mod synthesis;
pub mod telemetry;
mod window;

use periodicity::PeriodicityEstimator;
use telemetry::GrainTrace;

/// Tuning for the detection stage. The defaults suit voice-range material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftConfig {
    /// Highest detectable fundamental, in Hz.
    pub max_hz: f32,
    /// Lowest detectable fundamental, in Hz.
    pub min_hz: f32,
    /// Length of one period-analysis window, in milliseconds.
    pub analysis_window_ms: f32,
    /// Multiplier on the period standard deviation when the second
    /// detection pass narrows its search range.
    pub deviation_scalar: f32,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            max_hz: 1700.0,
            min_hz: 75.0,
            analysis_window_ms: 40.0,
            deviation_scalar: 2.2,
        }
    }
}

impl ShiftConfig {
    /// Converts the Hz bounds and window length into sample-domain values,
    /// rejecting combinations that cannot describe a searchable period
    /// range at this sample rate.
    fn derive(&self, sample_rate: u32) -> Result<DerivedConfig, PsolaError> {
        if !self.max_hz.is_finite()
            || !self.min_hz.is_finite()
            || self.min_hz <= 0.0
            || self.max_hz <= self.min_hz
        {
            return Err(PsolaError::InvalidConfig(format!(
                "frequency bounds must satisfy max_hz > min_hz > 0, got max_hz={} min_hz={}",
                self.max_hz, self.min_hz
            )));
        }
        if !self.analysis_window_ms.is_finite() || self.analysis_window_ms <= 0.0 {
            return Err(PsolaError::InvalidConfig(format!(
                "analysis window must be a positive duration, got {} ms",
                self.analysis_window_ms
            )));
        }
        if !self.deviation_scalar.is_finite() || self.deviation_scalar < 0.0 {
            return Err(PsolaError::InvalidConfig(format!(
                "deviation scalar must be non-negative, got {}",
                self.deviation_scalar
            )));
        }

        let rate = sample_rate as f32;
        let min_period = (rate / self.max_hz) as usize;
        let max_period = (rate / self.min_hz) as usize;
        let window_len = (self.analysis_window_ms / 1000.0 * rate) as usize;

        if min_period == 0 || min_period >= max_period {
            return Err(PsolaError::InvalidConfig(format!(
                "period bounds collapse at {} Hz: min_period={} max_period={}",
                sample_rate, min_period, max_period
            )));
        }
        if window_len == 0 {
            return Err(PsolaError::InvalidConfig(format!(
                "analysis window of {} ms spans no samples at {} Hz",
                self.analysis_window_ms, sample_rate
            )));
        }

        Ok(DerivedConfig {
            min_period,
            max_period,
            window_len,
        })
    }
}

/// Sample-domain view of a validated configuration.
struct DerivedConfig {
    min_period: usize,
    max_period: usize,
    window_len: usize,
}

/// Shifts the pitch of every channel by `f_ratio` while keeping length and
/// channel count unchanged. Channels are processed independently and in
/// parallel; if any channel fails the whole call fails and no output is
/// returned.
pub fn pitch_shift(input: &Audio, f_ratio: f32, config: &ShiftConfig) -> Result<Audio, PsolaError> {
    validate_ratio(f_ratio)?;
    if input.sample_rate() == 0 {
        return Err(PsolaError::InvalidSampleRate);
    }
    if input.channel_count() == 0 || input.is_empty() {
        return Err(PsolaError::EmptyInput);
    }
    let derived = config.derive(input.sample_rate())?;
    debug!(
        channels = input.channel_count(),
        n_samples = input.len(),
        f_ratio,
        min_period = derived.min_period,
        max_period = derived.max_period,
        window_len = derived.window_len,
        "Starting TD-PSOLA pitch shift"
    );

    let shifted = input
        .channels()
        .par_iter()
        .map(|channel| shift_channel(channel, f_ratio, &derived, config.deviation_scalar, None))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(channels = shifted.len(), "Completed TD-PSOLA pitch shift");
    Audio::new(input.sample_rate(), shifted)
}

/// Like [`pitch_shift`], but restricted to mono input and additionally
/// returning the geometry of every synthesized grain.
pub fn pitch_shift_traced(
    input: &Audio,
    f_ratio: f32,
    config: &ShiftConfig,
) -> Result<(Audio, GrainTrace), PsolaError> {
    validate_ratio(f_ratio)?;
    if input.sample_rate() == 0 {
        return Err(PsolaError::InvalidSampleRate);
    }
    if input.channel_count() == 0 || input.is_empty() {
        return Err(PsolaError::EmptyInput);
    }
    if input.channel_count() != 1 {
        return Err(PsolaError::TelemetryRequiresMono(input.channel_count()));
    }
    let derived = config.derive(input.sample_rate())?;

    let mut trace = GrainTrace::default();
    let shifted = shift_channel(
        input.channel(0),
        f_ratio,
        &derived,
        config.deviation_scalar,
        Some(&mut trace),
    )?;
    debug!(
        grains = trace.grains.len(),
        n_samples = shifted.len(),
        "Completed traced TD-PSOLA pitch shift"
    );
    Ok((Audio::mono(input.sample_rate(), shifted), trace))
}

fn validate_ratio(f_ratio: f32) -> Result<(), PsolaError> {
    if !f_ratio.is_finite() || f_ratio <= 0.0 {
        return Err(PsolaError::InvalidRatio(f_ratio));
    }
    Ok(())
}

/// One channel's full pass: periodicity detection, mark placement,
/// retiming, grain resynthesis. The estimator and its scratch live only for
/// the duration of the pass, so concurrent channels never share state.
fn shift_channel(
    samples: &[f32],
    f_ratio: f32,
    derived: &DerivedConfig,
    deviation_scalar: f32,
    mut trace: Option<&mut GrainTrace>,
) -> Result<Vec<f32>, PsolaError> {
    let mut estimator = PeriodicityEstimator::new();
    let periods = estimator.estimate(
        samples,
        derived.window_len,
        derived.min_period,
        derived.max_period,
        deviation_scalar,
    );
    if periods.is_empty() {
        return Err(PsolaError::DetectionFailed);
    }

    let analysis_marks = marks::place_marks(samples, &periods, derived.window_len);
    if analysis_marks.is_empty() {
        return Err(PsolaError::MarkPlacementFailed);
    }

    let synthesis_marks = marks::retime_marks(&analysis_marks, f_ratio);
    debug!(
        periods = periods.len(),
        analysis_marks = analysis_marks.len(),
        synthesis_marks = synthesis_marks.len(),
        "Derived pitch marks"
    );

    if let Some(trace) = trace.as_deref_mut() {
        trace.f_ratio = f_ratio;
        trace.signal_len = samples.len();
        trace.analysis_mark_count = analysis_marks.len();
        trace.synthesis_mark_count = synthesis_marks.len();
    }

    Ok(synthesis::synthesize(
        samples,
        &analysis_marks,
        &synthesis_marks,
        f_ratio,
        trace,
    ))
}
