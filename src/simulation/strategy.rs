// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Signal strategies and their dispatch table

use super::channel::{Channel, SignalType};
use super::error::SimulationError;
use super::generators::{noisy_sine_value, ramp_value};
use crate::utility::noise_generator::NoiseGenerator;

/// Trait for computing a channel's next register value
pub trait SignalStrategy: Send + Sync {
    /// Compute the register value of `channel` at the given global step
    fn calculate(&self, channel: &Channel, step: f64, noise: &mut NoiseGenerator) -> i16;
}

/// Sine wave with the channel's jitter applied
pub struct SineStrategy;

impl SignalStrategy for SineStrategy {
    fn calculate(&self, channel: &Channel, step: f64, noise: &mut NoiseGenerator) -> i16 {
        noisy_sine_value(
            channel.base_value,
            channel.amplitude,
            channel.period,
            step,
            channel.noise_range,
            noise,
        )
    }
}

/// Linear sawtooth from `min` to `max`
pub struct RampStrategy;

impl SignalStrategy for RampStrategy {
    fn calculate(&self, channel: &Channel, step: f64, _noise: &mut NoiseGenerator) -> i16 {
        ramp_value(channel.min, channel.max, channel.step_size, step)
    }
}

/// Maps a [`SignalType`] to the strategy computing it.
///
/// The set of strategies is closed: every known variant resolves to exactly one
/// implementation and [`SignalType::Unsupported`] resolves to an error naming
/// the offending type.
pub struct StrategyTable {
    sine: SineStrategy,
    ramp: RampStrategy,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyTable {
    pub fn new() -> Self {
        Self {
            sine: SineStrategy,
            ramp: RampStrategy,
        }
    }

    /// Find the strategy for a channel
    pub fn resolve(&self, channel: &Channel) -> Result<&dyn SignalStrategy, SimulationError> {
        match &channel.signal_type {
            SignalType::Sine => Ok(&self.sine),
            SignalType::Ramp => Ok(&self.ramp),
            SignalType::Unsupported(name) => Err(SimulationError::UnsupportedSignalType {
                channel: channel.name.clone(),
                signal_type: name.clone(),
            }),
        }
    }

    /// Resolve and evaluate in one call
    pub fn calculate(
        &self,
        channel: &Channel,
        step: f64,
        noise: &mut NoiseGenerator,
    ) -> Result<i16, SimulationError> {
        Ok(self.resolve(channel)?.calculate(channel, step, noise))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_strategy_scenario() {
        let table = StrategyTable::new();
        let mut noise = NoiseGenerator::new(1);
        let channel = Channel::sine("Sine_Sample", 0, 250.0, 50.0, 60.0);
        assert_eq!(table.calculate(&channel, 15.0, &mut noise), Ok(300));
    }

    #[test]
    fn test_ramp_strategy_scenario() {
        let table = StrategyTable::new();
        let mut noise = NoiseGenerator::new(1);
        let channel = Channel::ramp("Ramp_Sample", 1, 0.0, 1000.0, 100.0);
        assert_eq!(table.calculate(&channel, 12.0, &mut noise), Ok(200));
    }

    #[test]
    fn test_unknown_signal_type_is_an_explicit_error() {
        let table = StrategyTable::new();
        let mut noise = NoiseGenerator::new(1);
        let channel = Channel {
            name: "Pump".to_string(),
            signal_type: SignalType::from("Square"),
            ..Channel::default()
        };

        assert_eq!(
            table.calculate(&channel, 0.0, &mut noise),
            Err(SimulationError::UnsupportedSignalType {
                channel: "Pump".to_string(),
                signal_type: "Square".to_string(),
            })
        );
    }

    #[test]
    fn test_sine_strategy_uses_channel_noise() {
        let table = StrategyTable::new();
        let mut noise = NoiseGenerator::new(77);
        let channel = Channel::sine("Temp", 0, 250.0, 0.0, 60.0).with_noise(4);
        for step in 0..200 {
            let value = table.calculate(&channel, f64::from(step), &mut noise).unwrap();
            assert!((246..254).contains(&value));
        }
    }
}
