use rustfft::{FftPlanner, num_complex::Complex};
use tracing::debug;

/// Per-window pitch period detector based on frequency-domain
/// autocorrelation.
///
/// The planner and the complex scratch buffer live on the estimator, so one
/// instance can sweep any number of windows (and both detection passes)
/// without reallocating; plans are rebuilt only when the window size changes.
pub(crate) struct PeriodicityEstimator {
    planner: FftPlanner<f32>,
    bins: Vec<Complex<f32>>,
}

impl PeriodicityEstimator {
    pub(crate) fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            bins: Vec::new(),
        }
    }

    /// Estimates one pitch period per `window_len`-sized window of `signal`
    /// (the final window may be shorter), searching lags in
    /// `[min_period, max_period)`.
    ///
    /// Runs two passes: the second narrows the lag range to
    /// `mean ± deviation_scalar * std` of the first pass, which suppresses
    /// octave errors and vibrato outliers. Returns an empty vector when the
    /// signal is empty or the lag range does not fit below the transform's
    /// usable half.
    pub(crate) fn estimate(
        &mut self,
        signal: &[f32],
        window_len: usize,
        min_period: usize,
        max_period: usize,
        deviation_scalar: f32,
    ) -> Vec<usize> {
        if signal.is_empty() || window_len == 0 {
            return Vec::new();
        }

        let fft_size = window_len.next_power_of_two();
        if min_period >= fft_size / 2 {
            debug!(
                min_period,
                fft_size, "Period search range does not fit the analysis window"
            );
            return Vec::new();
        }

        let first_pass = self.periods_per_window(signal, window_len, min_period, max_period);

        let (mean, std_dev) = mean_std(&first_pass);
        let lower = (mean - deviation_scalar * std_dev) as i64;
        let upper = (mean + deviation_scalar * std_dev) as i64;
        let narrowed_min = if lower > min_period as i64 {
            lower as usize
        } else {
            min_period
        };
        let narrowed_max = if upper < max_period as i64 {
            upper as usize
        } else {
            max_period
        };
        debug!(
            windows = first_pass.len(),
            mean,
            std_dev,
            narrowed_min,
            narrowed_max,
            "Narrowed period search range for second pass"
        );

        self.periods_per_window(signal, window_len, narrowed_min, narrowed_max)
    }

    /// One detection sweep: autocorrelation per window via forward FFT,
    /// DC-bin removal, power spectrum, inverse FFT, then a peak scan over
    /// the allowed lag range.
    fn periods_per_window(
        &mut self,
        signal: &[f32],
        window_len: usize,
        min_period: usize,
        max_period: usize,
    ) -> Vec<usize> {
        let fft_size = window_len.next_power_of_two();
        let forward = self.planner.plan_fft_forward(fft_size);
        let inverse = self.planner.plan_fft_inverse(fft_size);

        let mut periods = Vec::with_capacity(signal.len().div_ceil(window_len));
        for window in signal.chunks(window_len) {
            self.bins.clear();
            self.bins
                .extend(window.iter().map(|&sample| Complex::new(sample, 0.0)));
            self.bins.resize(fft_size, Complex::new(0.0, 0.0));

            forward.process(&mut self.bins);
            // DC energy would otherwise dominate every autocorrelation peak.
            self.bins[0] = Complex::new(0.0, 0.0);
            for bin in self.bins.iter_mut() {
                *bin = Complex::new(bin.norm_sqr(), 0.0);
            }
            inverse.process(&mut self.bins);

            periods.push(dominant_lag(&self.bins, min_period, max_period));
        }
        periods
    }
}

/// Index of the strongest autocorrelation value over lags
/// `[min_period, min(max_period, bins.len() / 2))`. The first candidate is
/// `min_period` itself, so a degenerate range still resolves to `min_period`;
/// ties keep the earliest lag. Callers must ensure
/// `min_period < bins.len() / 2`.
fn dominant_lag(bins: &[Complex<f32>], min_period: usize, max_period: usize) -> usize {
    let upper = max_period.min(bins.len() / 2);
    let mut best = min_period;
    let mut best_value = bins[min_period].re;
    for lag in (min_period + 1)..upper {
        if bins[lag].re > best_value {
            best_value = bins[lag].re;
            best = lag;
        }
    }
    best
}

/// Population mean and standard deviation; (0, 0) for an empty slice.
fn mean_std(values: &[usize]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<usize>() as f32 / values.len() as f32;
    let variance = values
        .iter()
        .map(|&value| {
            let delta = value as f32 - mean;
            delta * delta
        })
        .sum::<f32>()
        / values.len() as f32;
    (mean, variance.sqrt())
}
