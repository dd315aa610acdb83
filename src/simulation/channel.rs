// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Channel model
//!
//! A [`Channel`] binds one simulated signal to one holding register. Channels
//! are pure data: the engine reads their parameters each tick and stores the
//! computed result back in [`Channel::current_value`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Waveform family selected by a channel.
///
/// Deserialized from a case-sensitive string. Names that do not match a known
/// family are kept as [`SignalType::Unsupported`] so the engine can report them
/// by name instead of failing the whole configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalType {
    /// Sine wave with optional jitter
    Sine,
    /// Sawtooth ramp between `min` and `max`
    Ramp,
    /// Any other identifier found in the configuration
    Unsupported(String),
}

impl SignalType {
    pub fn as_str(&self) -> &str {
        match self {
            SignalType::Sine => "Sine",
            SignalType::Ramp => "Ramp",
            SignalType::Unsupported(name) => name,
        }
    }
}

impl From<String> for SignalType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Sine" => SignalType::Sine,
            "Ramp" => SignalType::Ramp,
            _ => SignalType::Unsupported(name),
        }
    }
}

impl From<&str> for SignalType {
    fn from(name: &str) -> Self {
        SignalType::from(name.to_string())
    }
}

impl From<SignalType> for String {
    fn from(signal_type: SignalType) -> Self {
        signal_type.as_str().to_string()
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated holding register.
///
/// Parameters for every waveform family live side by side so a configuration
/// file can switch `signal_type` without restructuring the entry. Only the
/// parameters of the selected family are read.
///
/// # Example
///
/// ```
/// use modbus_simulator::simulation::{Channel, SignalType};
///
/// let tank = Channel {
///     name: "Tank_Level".to_string(),
///     address: 4,
///     signal_type: SignalType::Ramp,
///     min: 0.0,
///     max: 500.0,
///     step_size: 5.0,
///     ..Channel::default()
/// };
/// assert_eq!(tank.current_value, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    /// Display label used in console output.
    pub name: String,

    /// Holding register address written every tick.
    pub address: u16,

    /// Waveform family computing this channel.
    pub signal_type: SignalType,

    /// Sine: center of the wave (e.g. 250 for 25.0 °C).
    pub base_value: f64,

    /// Sine: maximum deviation from `base_value`.
    pub amplitude: f64,

    /// Sine: steps needed for one full cycle. Must be greater than zero.
    pub period: f64,

    /// Sine: jitter half-width added to the rounded value.
    pub noise_range: i16,

    /// Ramp: lower bound (inclusive).
    pub min: f64,

    /// Ramp: upper bound (exclusive). Must be greater than `min`.
    pub max: f64,

    /// Ramp: increment per global step.
    pub step_size: f64,

    /// Value computed by the most recent completed tick.
    #[serde(skip)]
    pub current_value: i16,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            name: "Channel".to_string(),
            address: 0,
            signal_type: SignalType::Sine,
            base_value: 0.0,
            amplitude: 5.0,
            period: 60.0,
            noise_range: 0,
            min: 0.0,
            max: 1000.0,
            step_size: 100.0,
            current_value: 0,
        }
    }
}

impl Channel {
    /// Sine channel centered on `base_value`.
    pub fn sine(name: &str, address: u16, base_value: f64, amplitude: f64, period: f64) -> Self {
        Self {
            name: name.to_string(),
            address,
            signal_type: SignalType::Sine,
            base_value,
            amplitude,
            period,
            ..Self::default()
        }
    }

    /// Sawtooth channel wrapping from `max` back to `min`.
    pub fn ramp(name: &str, address: u16, min: f64, max: f64, step_size: f64) -> Self {
        Self {
            name: name.to_string(),
            address,
            signal_type: SignalType::Ramp,
            min,
            max,
            step_size,
            ..Self::default()
        }
    }

    /// Add jitter to a sine channel.
    pub fn with_noise(mut self, noise_range: i16) -> Self {
        self.noise_range = noise_range;
        self
    }

    /// Value as shown to operators; registers carry deci-units.
    pub fn scaled_value(&self) -> f64 {
        f64::from(self.current_value) / 10.0
    }

    /// Human readable summary of the configured signal bounds.
    pub fn range_display(&self) -> String {
        match &self.signal_type {
            SignalType::Sine => format!(
                "Sine: {} ± {} (noise ±{}, period {} steps)",
                self.base_value, self.amplitude, self.noise_range, self.period
            ),
            SignalType::Ramp => format!(
                "Ramp: [{}, {}) step {}",
                self.min, self.max, self.step_size
            ),
            SignalType::Unsupported(name) => format!("Unsupported signal type '{}'", name),
        }
    }
}
