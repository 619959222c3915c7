//! Checks over sample streams.

use stride_core::FootPoseSample;

/// Largest absolute change of `value` between consecutive samples.
pub fn max_jump(samples: &[FootPoseSample], value: impl Fn(&FootPoseSample) -> f64) -> f64 {
    samples
        .windows(2)
        .map(|w| (value(&w[1]) - value(&w[0])).abs())
        .fold(0.0, f64::max)
}

/// Largest disagreement between the finite difference of `value` and the
/// trapezoidal average of its claimed `derivative`, over consecutive samples.
///
/// For a C²-smooth trajectory this is `O(period²)`; a jump in `value` or in
/// `derivative` shows up as an error of order `jump / period`.
pub fn finite_difference_error(
    samples: &[FootPoseSample],
    period: f64,
    value: impl Fn(&FootPoseSample) -> f64,
    derivative: impl Fn(&FootPoseSample) -> f64,
) -> f64 {
    samples
        .windows(2)
        .map(|w| {
            let fd = (value(&w[1]) - value(&w[0])) / period;
            let avg = 0.5 * (derivative(&w[0]) + derivative(&w[1]));
            (fd - avg).abs()
        })
        .fold(0.0, f64::max)
}

/// `true` if `values` never move against `increasing` by more than `tol`.
pub fn is_monotone(values: &[f64], increasing: bool, tol: f64) -> bool {
    values.windows(2).all(|w| {
        if increasing {
            w[1] >= w[0] - tol
        } else {
            w[1] <= w[0] + tol
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
