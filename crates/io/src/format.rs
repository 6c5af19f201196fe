//! Text rendering of CSV rows.

use std::fmt::Write;

use nmmc_markov::StateKey;

/// Field separator.
pub(crate) const SEPARATOR: char = ',';

/// Largest error [`push_fixed2`] introduces in a single value.
const HALF_STEP: f64 = 0.005;

/// Row-sum tolerance for a matrix that went through the two-decimal codec.
///
/// Each of the `n_states` values may move by up to half a step, so a row read
/// back can sum to anywhere in `1 +/- n_states * 0.005`. Pass the result to
/// [`TransitionMatrix::validate_with_tolerance`](nmmc_markov::TransitionMatrix::validate_with_tolerance).
pub fn read_back_tolerance(n_states: usize) -> f64 {
    n_states as f64 * HALF_STEP + 1e-9
}

/// Appends `value` with exactly two decimals, rounding ties away from zero.
///
/// `{:.2}` rounds the exact binary value correctly but resolves exact ties to
/// even. Exact ties at two decimals only occur for odd multiples of 1/8, where
/// `value * 100.0` is exact, so those are rounded through the scaled integer.
/// Decimal ties that are not exact in binary follow the stored value: 0.015
/// is stored just below 0.015 and renders as `0.01`.
pub(crate) fn push_fixed2(out: &mut String, value: f64) {
    let scaled = value * 100.0;
    let is_exact_tie = (value * 8.0).fract() == 0.0 && scaled.fract().abs() == 0.5;
    if is_exact_tie {
        let hundredths = scaled.round();
        let sign = if hundredths < 0.0 { "-" } else { "" };
        let h = hundredths.abs() as u64;
        let _ = write!(out, "{sign}{}.{:02}", h / 100, h % 100);
    } else {
        let _ = write!(out, "{value:.2}");
    }
}

/// Appends one `key,v0,...,vN\n` line, rendering each value with `push_value`.
pub(crate) fn push_row<T: Copy>(
    out: &mut String,
    key: &StateKey,
    values: &[T],
    push_value: impl Fn(&mut String, T),
) {
    out.push_str(key.as_str());
    for &v in values {
        out.push(SEPARATOR);
        push_value(out, v);
    }
    out.push('\n');
}
