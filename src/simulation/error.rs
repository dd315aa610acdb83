// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Errors raised by channel validation and strategy dispatch

use thiserror::Error;

/// Configuration and dispatch failures of the simulation core.
///
/// Pre-flight variants are returned by [`validate_channels`](super::validate_channels)
/// and abort `start()`. [`SimulationError::UnsupportedSignalType`] is only ever
/// produced per tick and is logged, never propagated out of the loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Channel #{channel} has an empty name")]
    EmptyChannelName { channel: usize },

    #[error("Channel '{channel}' address {address} is outside the register map (capacity {capacity})")]
    AddressOutOfRange {
        channel: String,
        address: u16,
        capacity: usize,
    },

    #[error("Channels '{first}' and '{second}' both target register {address}")]
    DuplicateAddress {
        address: u16,
        first: String,
        second: String,
    },

    #[error("Channel '{channel}' has a non-positive sine period ({period})")]
    InvalidPeriod { channel: String, period: f64 },

    #[error("Channel '{channel}' has a negative noise range ({noise_range})")]
    InvalidNoiseRange { channel: String, noise_range: i16 },

    #[error("Sampling interval must be greater than zero")]
    InvalidInterval,

    #[error("Signal type '{signal_type}' is not supported (channel '{channel}')")]
    UnsupportedSignalType {
        channel: String,
        signal_type: String,
    },
}
