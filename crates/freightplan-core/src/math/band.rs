// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Float;

/// Plateau score over `[lo, hi]` with linear falloff outside.
///
/// Returns 1 for `x` inside the band, `x / lo` below it, and a linear
/// ramp down to 0 at `x = 1` above it. Values past 1 (and any
/// non-finite input) score 0. `lo` and `hi` are expected to satisfy
/// `0 < lo <= hi < 1`.
#[inline]
pub fn band_score<F: Float>(x: F, lo: F, hi: F) -> F {
    if !x.is_finite() || x <= F::zero() {
        return F::zero();
    }
    if x < lo {
        return x / lo;
    }
    if x <= hi {
        return F::one();
    }
    let span = F::one() - hi;
    if span <= F::zero() {
        return F::zero();
    }
    ((F::one() - x) / span).max(F::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_band_is_one() {
        assert_eq!(band_score(0.6, 0.6, 0.9), 1.0);
        assert_eq!(band_score(0.75, 0.6, 0.9), 1.0);
        assert_eq!(band_score(0.9, 0.6, 0.9), 1.0);
    }

    #[test]
    fn test_below_band_ramps_linearly() {
        assert_eq!(band_score(0.0, 0.6, 0.9), 0.0);
        assert!((band_score(0.3, 0.6, 0.9) - 0.5).abs() < 1e-12);
        assert!((band_score(0.45, 0.6, 0.9) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_above_band_falls_to_zero_at_full() {
        assert!((band_score(0.95, 0.6, 0.9) - 0.5).abs() < 1e-12);
        assert_eq!(band_score(1.0, 0.6, 0.9), 0.0);
        assert_eq!(band_score(1.2, 0.6, 0.9), 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(band_score(f64::NAN, 0.6, 0.9), 0.0);
        assert_eq!(band_score(-0.1, 0.6, 0.9), 0.0);
    }
}
