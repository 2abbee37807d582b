// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point quantization of the two parameters the allocator deduplicates
//! after placement: spike thresholds and pre-synaptic trace magnitudes.

use crate::error::{HardwareError, HardwareResult};

/// Fixed exponent used for every threshold.
pub const VTH_EXP: i32 = 6;

/// Largest representable threshold mantissa (17 bits).
pub const VTH_MAN_MAX: i32 = (1 << 17) - 1;

/// Number of fractional bits of a trace spike magnitude.
pub const TRACE_MAG_FRAC_BITS: u32 = 7;

/// Exclusive upper bound on a trace spike magnitude (7 integer bits).
pub const TRACE_MAG_MAX: f64 = 128.0;

/// Split a threshold into `(mantissa, exponent)` with `vth ~= mantissa * 2^exponent`.
///
/// # Errors
///
/// Returns [`HardwareError::ThresholdOutOfRange`] if the rounded mantissa is
/// not in `1..=VTH_MAN_MAX`.
pub fn threshold_to_mantissa_exponent(vth: f64) -> HardwareResult<(i32, i32)> {
    let mantissa = (vth / f64::from(1 << VTH_EXP)).round();
    if !mantissa.is_finite() || mantissa < 1.0 || mantissa > f64::from(VTH_MAN_MAX) {
        return Err(HardwareError::ThresholdOutOfRange {
            vth,
            mantissa: if mantissa.is_finite() { mantissa as i64 } else { i64::MAX },
            max: VTH_MAN_MAX,
        });
    }
    Ok((mantissa as i32, VTH_EXP))
}

/// Split a trace spike magnitude into integer and 7-bit fractional parts.
///
/// The fractional part is truncated, so `int + frac / 128 <= magnitude`.
///
/// # Errors
///
/// Returns [`HardwareError::TraceMagnitudeOutOfRange`] for negative,
/// non-finite, or too large magnitudes.
pub fn trace_magnitude_to_int_frac(magnitude: f64) -> HardwareResult<(i32, i32)> {
    if !magnitude.is_finite() || !(0.0..TRACE_MAG_MAX).contains(&magnitude) {
        return Err(HardwareError::TraceMagnitudeOutOfRange {
            magnitude,
            max: TRACE_MAG_MAX,
        });
    }
    let mag_int = magnitude.trunc();
    let mag_frac = ((magnitude - mag_int) * f64::from(1u32 << TRACE_MAG_FRAC_BITS)).trunc();
    Ok((mag_int as i32, mag_frac as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_rounds_to_mantissa() {
        assert_eq!(threshold_to_mantissa_exponent(64.0).unwrap(), (1, 6));
        assert_eq!(threshold_to_mantissa_exponent(6400.0).unwrap(), (100, 6));
        // 100.0 / 64 = 1.5625 -> 2
        assert_eq!(threshold_to_mantissa_exponent(100.0).unwrap(), (2, 6));
    }

    #[test]
    fn test_threshold_out_of_range() {
        assert!(threshold_to_mantissa_exponent(0.0).is_err());
        assert!(threshold_to_mantissa_exponent(-640.0).is_err());
        assert!(threshold_to_mantissa_exponent(f64::NAN).is_err());
        let too_big = f64::from(VTH_MAN_MAX + 1) * 64.0;
        assert!(matches!(
            threshold_to_mantissa_exponent(too_big),
            Err(HardwareError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_trace_magnitude_split() {
        assert_eq!(trace_magnitude_to_int_frac(0.0).unwrap(), (0, 0));
        assert_eq!(trace_magnitude_to_int_frac(1.5).unwrap(), (1, 64));
        assert_eq!(trace_magnitude_to_int_frac(3.25).unwrap(), (3, 32));
    }

    #[test]
    fn test_trace_magnitude_out_of_range() {
        assert!(trace_magnitude_to_int_frac(-0.5).is_err());
        assert!(trace_magnitude_to_int_frac(128.0).is_err());
        assert!(trace_magnitude_to_int_frac(f64::INFINITY).is_err());
    }
}
