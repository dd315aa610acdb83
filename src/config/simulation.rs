// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::simulation::Channel;

/// Tick cadence and the ordered list of simulated channels.
///
/// # Example
///
/// ```yaml
/// simulation:
///   sampling_interval_ms: 1000
///   channels:
///     - name: Sine_Sample
///       address: 0
///       signal_type: Sine
///       base_value: 250
///       amplitude: 50
///       period: 60
///     - name: Ramp_Sample
///       address: 1
///       signal_type: Ramp
///       min: 0
///       max: 1000
///       step_size: 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay between two ticks, in milliseconds. Must be greater than zero.
    pub sampling_interval_ms: u64,

    /// Channels evaluated every tick, in this order.
    pub channels: Vec<Channel>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sampling_interval_ms: 1000,
            channels: vec![
                Channel::sine("Sine_Sample", 0, 250.0, 50.0, 60.0),
                Channel::ramp("Ramp_Sample", 1, 0.0, 1000.0, 100.0),
            ],
        }
    }
}
