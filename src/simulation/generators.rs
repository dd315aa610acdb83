// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Waveform generators
//!
//! Every generator takes the logical time step as an explicit parameter and
//! keeps no internal counter, so the output is fully determined by the
//! arguments (plus the jitter source for [`noisy_sine_value`]).
//!
//! Values are produced in register units: floating-point results are rounded
//! half away from zero and saturated to the signed 16-bit register width.

use std::f64::consts::PI;

use log::warn;

use crate::utility::noise_generator::NoiseGenerator;

/// Round half away from zero and saturate to a 16-bit register.
fn to_register(value: f64) -> i16 {
    // `as` saturates out-of-range floats and maps NaN to 0
    value.round() as i16
}

/// Sine wave sample.
///
/// `base_value + amplitude * sin(2π * step / period)`.
///
/// The step is reduced modulo the period before the phase is computed, so
/// `step` and `step + period` always produce the same sample.
///
/// A non-positive `period` is rejected by channel validation before the
/// engine starts. If one still reaches this function the wave is treated as
/// flat and the rounded base value is returned.
///
/// # Examples
///
/// ```
/// use modbus_simulator::simulation::generators::sine_value;
///
/// // A quarter period reaches the crest
/// assert_eq!(sine_value(250.0, 50.0, 60.0, 15.0), 300);
/// ```
pub fn sine_value(base_value: f64, amplitude: f64, period: f64, step: f64) -> i16 {
    if period <= 0.0 {
        return to_register(base_value);
    }
    let phase = step.rem_euclid(period);
    let radians = 2.0 * PI * phase / period;
    to_register(base_value + amplitude * radians.sin())
}

/// Sine wave sample with jitter applied to the rounded result.
pub fn noisy_sine_value(
    base_value: f64,
    amplitude: f64,
    period: f64,
    step: f64,
    noise_range: i16,
    noise: &mut NoiseGenerator,
) -> i16 {
    noise.jitter(sine_value(base_value, amplitude, period, step), noise_range)
}

/// Sawtooth ramp sample in `[min, max)`.
///
/// The ramp advances by `step_size` per step and wraps back to `min` every
/// `(max - min) / step_size` steps. The modulo is Euclidean, so negative step
/// sizes walk down the ramp instead of leaving the range.
///
/// The result is the smallest integer not below `min` whenever rounding
/// would leave the range: below a fractional `min`, or at the exclusive `max`
/// (the wrap point). A range narrower than one unit may hold no integer at
/// all, in which case the rounded `min` is returned.
///
/// When `max <= min` a warning is logged and the rounded `min` is returned.
///
/// # Examples
///
/// ```
/// use modbus_simulator::simulation::generators::ramp_value;
///
/// assert_eq!(ramp_value(0.0, 1000.0, 100.0, 12.0), 200);
/// ```
pub fn ramp_value(min: f64, max: f64, step_size: f64, step: f64) -> i16 {
    if max <= min {
        warn!(
            "Ramp configuration error: max ({}) must be greater than min ({})",
            max, min
        );
        return to_register(min);
    }

    let lowest = to_register(min.ceil());
    if f64::from(lowest) >= max {
        return to_register(min);
    }

    let range = max - min;
    let distance = step_size * step;
    let value = to_register(distance.rem_euclid(range) + min);

    let value_f = f64::from(value);
    if value_f < min || value_f >= max {
        lowest
    } else {
        value
    }
}
