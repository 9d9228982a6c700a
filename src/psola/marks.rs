// Acceptance band around the local period estimate. A new mark is only
// taken within ±2% of one period after its predecessor, which keeps the
// sequence monotonic and period-synchronous even when the waveform has
// competing peaks. The first mark may sit anywhere in the first 1.1 periods.
const BAND_LOW: f32 = 0.98;
const BAND_HIGH: f32 = 1.02;
const FIRST_MARK_SPAN: f32 = 1.1;

/// Places period-synchronous marks at local amplitude peaks.
///
/// The first mark anchors at the strongest sample near the signal start;
/// each following mark is the strongest sample inside the period band after
/// its predecessor, using the period estimate of the analysis window the
/// predecessor falls in (`periods[prev / hop_size]`). Placement stops when
/// the next band would run past the signal or past the estimate sequence.
pub(crate) fn place_marks(signal: &[f32], periods: &[usize], hop_size: usize) -> Vec<usize> {
    if signal.is_empty() || periods.is_empty() || hop_size == 0 {
        return Vec::new();
    }

    let first_span = ((periods[0] as f32 * FIRST_MARK_SPAN) as usize).min(signal.len());
    let mut prev = peak_index(signal, 0, first_span.max(1));
    let mut marks = vec![prev];

    loop {
        let Some(&period) = periods.get(prev / hop_size) else {
            break;
        };
        let band_low = prev + (period as f32 * BAND_LOW) as usize;
        let band_high = prev + (period as f32 * BAND_HIGH) as usize;
        if band_high >= signal.len() {
            break;
        }

        let next = peak_index(signal, band_low, band_high + 1);
        if next <= prev {
            // A period estimate of one sample pins the band to the previous
            // mark; stop rather than stall.
            break;
        }
        marks.push(next);
        prev = next;
    }

    marks
}

/// Index of the sample with the largest absolute amplitude in
/// `[start, end)`; ties keep the earliest index. The range must be
/// non-empty and lie inside the signal.
fn peak_index(signal: &[f32], start: usize, end: usize) -> usize {
    let mut best = start;
    let mut best_amp = signal[start].abs();
    for i in (start + 1)..end {
        let amp = signal[i].abs();
        if amp > best_amp {
            best_amp = amp;
            best = i;
        }
    }
    best
}

/// Maps `marks` onto `round(len * f_ratio)` fractional positions by linear
/// interpolation in index space.
///
/// Ratios above one produce more, closer-spaced marks (higher pitch);
/// ratios below one produce fewer, wider-spaced ones. The first and last
/// analysis marks bound the retimed timeline, so output length is governed
/// by the mark count alone.
pub(crate) fn retime_marks(marks: &[usize], f_ratio: f32) -> Vec<f32> {
    if marks.is_empty() {
        return Vec::new();
    }

    let target_count = (marks.len() as f32 * f_ratio).round() as usize;
    let span = (marks.len() - 1) as f32;
    let step_count = if target_count > 1 {
        (target_count - 1) as f32
    } else {
        1.0
    };

    let mut retimed = Vec::with_capacity(target_count);
    for i in 0..target_count {
        let reference = i as f32 * span / step_count;
        let left = (reference.floor() as usize).min(marks.len() - 1);
        let right = (reference.ceil() as usize).min(marks.len() - 1);
        let weight = reference - left as f32;
        retimed.push(marks[left] as f32 + weight * (marks[right] as f32 - marks[left] as f32));
    }
    retimed
}
