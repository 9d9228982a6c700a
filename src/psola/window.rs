use std::f32::consts::PI;

/// Fills `window` with a Tukey (tapered cosine) window.
///
/// `alpha` is the taper fraction: 0 gives a rectangular window (all ones),
/// 1 a fully tapered, Hann-like shape. Values outside `[0, 1]` are clamped.
/// The buffer keeps its length; only its contents are overwritten, so one
/// scratch vector can serve grains of any size.
pub(crate) fn fill_tukey(window: &mut [f32], alpha: f32) {
    let size = window.len();
    if size == 0 {
        return;
    }

    let alpha = alpha.clamp(0.0, 1.0);
    if alpha == 0.0 {
        window.fill(1.0);
        return;
    }

    let taper_length = (alpha * (size - 1) as f32 / 2.0).round() as usize;

    for (i, w) in window.iter_mut().enumerate() {
        *w = if i < taper_length {
            let x = i as f32 / taper_length as f32;
            0.5 * (1.0 - (PI * x).cos())
        } else if i >= size - taper_length {
            let x = (size - 1 - i) as f32 / taper_length as f32;
            0.5 * (1.0 - (PI * x).cos())
        } else {
            1.0
        };
    }
}
