// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Signal simulation core
//!
//! This module turns a list of [`Channel`] descriptions into time-varying
//! holding register values.
//!
//! ## Key Components
//!
//! - [`generators`]: stateless waveform functions (sine, noisy sine, ramp).
//! - [`StrategyTable`]: resolves a channel's [`SignalType`] to its generator.
//! - [`SimulatorEngine`]: the background loop writing channel values into
//!   the register map on a fixed cadence.
//! - [`validate_channels`]: pre-flight checks run by `start()`.

pub mod channel;
pub mod engine;
pub mod error;
pub mod generators;
pub mod strategy;

use std::collections::HashMap;

pub use channel::{Channel, SignalType};
pub use engine::{SimulatorEngine, STOP_GRACE_PERIOD};
pub use error::SimulationError;
pub use strategy::{RampStrategy, SignalStrategy, SineStrategy, StrategyTable};

/// Check a channel list against a register map of `capacity` registers.
///
/// Fails on the first channel that has an empty name, an address outside the
/// map, an address already used by an earlier channel, or (for sine channels)
/// a non-positive period or a negative noise range.
///
/// Ramp bounds and unknown signal types are not checked here; both degrade
/// per tick with a warning instead.
pub fn validate_channels(channels: &[Channel], capacity: usize) -> Result<(), SimulationError> {
    let mut owners: HashMap<u16, &str> = HashMap::with_capacity(channels.len());

    for (index, channel) in channels.iter().enumerate() {
        if channel.name.trim().is_empty() {
            return Err(SimulationError::EmptyChannelName { channel: index });
        }

        if usize::from(channel.address) >= capacity {
            return Err(SimulationError::AddressOutOfRange {
                channel: channel.name.clone(),
                address: channel.address,
                capacity,
            });
        }

        if let Some(first) = owners.insert(channel.address, &channel.name) {
            return Err(SimulationError::DuplicateAddress {
                address: channel.address,
                first: first.to_string(),
                second: channel.name.clone(),
            });
        }

        if channel.signal_type == SignalType::Sine {
            if channel.period.is_nan() || channel.period <= 0.0 {
                return Err(SimulationError::InvalidPeriod {
                    channel: channel.name.clone(),
                    period: channel.period,
                });
            }
            if channel.noise_range < 0 {
                return Err(SimulationError::InvalidNoiseRange {
                    channel: channel.name.clone(),
                    noise_range: channel.noise_range,
                });
            }
        }
    }

    Ok(())
}
