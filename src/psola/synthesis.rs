use crate::psola::telemetry::{GrainRecord, GrainTrace};
use crate::psola::window::fill_tukey;

// Taper fraction for the grain window. Upward shifts overlap grains less,
// so a flatter window keeps more of each grain's energy; downward shifts
// overlap more and get a stronger taper to soften the seams.
const ALPHA_RAISE: f32 = 0.8;
const ALPHA_LOWER: f32 = 0.6;

pub(crate) fn grain_alpha(f_ratio: f32) -> f32 {
    if f_ratio >= 1.0 { ALPHA_RAISE } else { ALPHA_LOWER }
}

/// Rebuilds the signal by overlap-adding one Tukey-windowed grain per
/// synthesis mark into a silent buffer of the input's length.
///
/// Each mark is served by its nearest analysis mark: the grain spans from
/// that mark's predecessor to its successor in the source, and the same
/// span around the synthesis position in the output. Contributions
/// accumulate, so overlapping grains sum. When a trace is supplied, every
/// grain's geometry is recorded; the trace never influences the audio.
pub(crate) fn synthesize(
    signal: &[f32],
    analysis_marks: &[usize],
    synthesis_marks: &[f32],
    f_ratio: f32,
    mut trace: Option<&mut GrainTrace>,
) -> Vec<f32> {
    let mut output = vec![0.0; signal.len()];
    if analysis_marks.is_empty() {
        return output;
    }

    let alpha = grain_alpha(f_ratio);
    let mut window = Vec::new();

    for (grain_id, &synthesis_mark) in synthesis_marks.iter().enumerate() {
        let source_index = nearest_mark(analysis_marks, synthesis_mark);
        let source_mark = analysis_marks[source_index];
        let (to_prev, to_next) = local_support(analysis_marks, source_index, signal.len());

        let dest_center = synthesis_mark as i64;
        let dest_start = (dest_center - to_prev as i64).max(0) as usize;
        if dest_start >= signal.len() {
            // This grain and everything after it lands past the buffer.
            break;
        }
        let dest_end = ((dest_center + to_next as i64) as usize).min(signal.len());
        let grain_len = dest_end - dest_start;

        window.resize(grain_len, 0.0);
        fill_tukey(&mut window, alpha);

        let source_start = source_mark.saturating_sub(to_prev);
        let source_end = (source_mark + to_next)
            .min(signal.len())
            .min(source_start + grain_len);

        let copy_len = grain_len.min(source_end - source_start);
        for i in 0..copy_len {
            output[dest_start + i] += window[i] * signal[source_start + i];
        }

        if let Some(trace) = trace.as_deref_mut() {
            let source_period = if source_index + 1 < analysis_marks.len() {
                analysis_marks[source_index + 1] - source_mark
            } else {
                to_next
            };
            let synthesis_period = if grain_id + 1 < synthesis_marks.len() {
                (synthesis_marks[grain_id + 1] - synthesis_mark) as usize
            } else {
                to_next
            };
            trace.record(GrainRecord {
                grain_id,
                start_sample: dest_start,
                center_sample: dest_center as usize,
                end_sample: dest_end,
                source_analysis_id: source_index,
                source_start,
                source_center: source_mark,
                source_end,
                source_period,
                synthesis_period,
                duration_samples: grain_len,
                window_alpha: alpha,
            });
        }
    }

    output
}

/// Index of the analysis mark closest to `position`; ties keep the earliest
/// mark. `marks` must be non-empty.
fn nearest_mark(marks: &[usize], position: f32) -> usize {
    let mut best = 0;
    let mut best_distance = (marks[0] as f32 - position).abs();
    for (index, &mark) in marks.iter().enumerate().skip(1) {
        let distance = (mark as f32 - position).abs();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Half-widths of the grain around analysis mark `index`: the distance to
/// the previous mark (or to the signal start for the first mark) and to the
/// next mark (or to the last sample for the final mark), both truncated so
/// the span stays inside `[0, signal_len)`.
fn local_support(marks: &[usize], index: usize, signal_len: usize) -> (usize, usize) {
    let mark = marks[index];
    let mut to_prev = if index == 0 {
        mark
    } else {
        mark - marks[index - 1]
    };
    let mut to_next = if index + 1 == marks.len() {
        signal_len - 1 - mark
    } else {
        marks[index + 1] - mark
    };

    if to_prev > mark {
        to_prev = mark;
    }
    if mark + to_next > signal_len - 1 {
        to_next = signal_len - 1 - mark;
    }
    (to_prev, to_next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_wave(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * std::f32::consts::PI * freq * n as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    // -------- Boundary rules --------

    #[test]
    fn test_nearest_mark_prefers_first_on_ties() {
        let marks = [10, 20, 40];
        assert_eq!(nearest_mark(&marks, 12.0), 0);
        assert_eq!(nearest_mark(&marks, 15.0), 0); // tie with 20 keeps 10
        assert_eq!(nearest_mark(&marks, 15.5), 1);
        assert_eq!(nearest_mark(&marks, 100.0), 2);
    }

    #[test]
    fn test_local_support_interior_mark_reaches_both_neighbors() {
        let marks = [20, 50, 90];
        assert_eq!(local_support(&marks, 1, 200), (30, 40));
    }

    #[test]
    fn test_local_support_first_mark_reaches_signal_start() {
        let marks = [20, 50];
        assert_eq!(local_support(&marks, 0, 200), (20, 30));
    }

    #[test]
    fn test_local_support_last_mark_reaches_signal_end() {
        let marks = [20, 50];
        assert_eq!(local_support(&marks, 1, 60), (30, 9));
    }

    #[test]
    fn test_local_support_single_mark_spans_whole_signal() {
        let marks = [5];
        assert_eq!(local_support(&marks, 0, 20), (5, 14));
    }

    #[test]
    fn test_grain_alpha_switches_at_unity() {
        assert_eq!(grain_alpha(2.0), 0.8);
        assert_eq!(grain_alpha(1.0), 0.8);
        assert_eq!(grain_alpha(0.99), 0.6);
        assert_eq!(grain_alpha(0.5), 0.6);
    }

    // -------- Overlap-add --------

    #[test]
    fn test_synthesize_identity_marks_reconstructs_nonsilent_signal() {
        let signal = sine_wave(200.0, 8000, 2000);
        let marks: Vec<usize> = (0..2000 / 40).map(|i| i * 40 + 10).collect();
        let synthesis: Vec<f32> = marks.iter().map(|&m| m as f32).collect();

        let output = synthesize(&signal, &marks, &synthesis, 1.0, None);

        assert_eq!(output.len(), signal.len());
        assert!(rms(&output) > 0.1, "overlap-add output should carry energy");
    }

    #[test]
    fn test_synthesize_accumulates_overlapping_grains() {
        let signal = vec![1.0; 50];
        let marks = vec![10, 20, 30, 40];
        let synthesis = vec![10.0, 20.0, 30.0, 40.0];

        let output = synthesize(&signal, &marks, &synthesis, 1.0, None);

        // Inside the overlap between adjacent grains the sum must exceed any
        // single windowed contribution of a unit signal.
        assert!(output[15] > 1.0, "expected summed contributions, got {}", output[15]);
    }

    #[test]
    fn test_synthesize_silence_yields_silence() {
        let silence = vec![0.0; 500];
        let marks = vec![50, 150, 250, 350];
        let synthesis = vec![50.0, 150.0, 250.0, 350.0];

        let output = synthesize(&silence, &marks, &synthesis, 2.0, None);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_synthesize_without_marks_returns_silence() {
        let signal = vec![1.0; 100];
        let output = synthesize(&signal, &[], &[], 1.0, None);
        assert_eq!(output.len(), 100);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_synthesize_records_one_grain_per_mark() {
        let signal = sine_wave(100.0, 8000, 1600);
        let marks = vec![40, 120, 200, 280, 360];
        let synthesis: Vec<f32> = marks.iter().map(|&m| m as f32).collect();

        let mut trace = GrainTrace::default();
        let _ = synthesize(&signal, &marks, &synthesis, 1.0, Some(&mut trace));

        assert_eq!(trace.grains.len(), synthesis.len());
        for (i, grain) in trace.grains.iter().enumerate() {
            assert_eq!(grain.grain_id, i);
            assert!(grain.start_sample <= grain.center_sample);
            assert!(grain.center_sample <= grain.end_sample);
            assert_eq!(grain.duration_samples, grain.end_sample - grain.start_sample);
            assert_eq!(grain.window_alpha, 0.8);
            assert!(grain.source_end <= signal.len());
        }
        // Interior grains report the spacing to their next analysis mark.
        assert_eq!(trace.grains[0].source_period, 80);
        assert_eq!(trace.grains[1].synthesis_period, 80);
    }

    #[test]
    fn test_synthesize_trace_does_not_change_audio() {
        let signal = sine_wave(150.0, 8000, 1200);
        let marks: Vec<usize> = (1..20).map(|i| i * 53).collect();
        let synthesis: Vec<f32> = marks.iter().map(|&m| m as f32 * 0.9).collect();

        let mut trace = GrainTrace::default();
        let traced = synthesize(&signal, &marks, &synthesis, 0.9, Some(&mut trace));
        let untraced = synthesize(&signal, &marks, &synthesis, 0.9, None);

        assert_eq!(traced, untraced);
        assert!(!trace.grains.is_empty());
    }
}
