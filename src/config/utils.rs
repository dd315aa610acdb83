// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, CONFIG_SCHEMA};
use crate::simulation::{validate_channels, SignalType, SimulationError};

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// # Example
///
/// ```bash
/// ./modbus_simulator --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Port Range**: the Modbus port must be within 1-65534
/// - **IP Address Format**: an unrecognized address only produces a warning
/// - **Sampling Interval**: must be greater than zero
/// - **Channels**: names, addresses against `register_count`, duplicate
///   addresses and sine parameters (see [`validate_channels`])
/// - **Ramp Bounds**: `max <= min` only produces a warning; such a channel
///   stays at `min` at run time
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.modbus.port < 1 || config.modbus.port > 65534 {
        anyhow::bail!("Invalid port number: {}", config.modbus.port);
    }

    if !is_valid_ip_address(&config.modbus.address) {
        // Hostnames are resolved at start
        warn!(
            "Potentially invalid address format: {}",
            config.modbus.address
        );
    }

    if config.simulation.sampling_interval_ms == 0 {
        return Err(SimulationError::InvalidInterval.into());
    }

    validate_channels(&config.simulation.channels, config.modbus.register_count)?;

    for channel in &config.simulation.channels {
        match &channel.signal_type {
            SignalType::Ramp if channel.max <= channel.min => warn!(
                "Channel '{}': ramp max ({}) must be greater than min ({})",
                channel.name, channel.max, channel.min
            ),
            SignalType::Unsupported(name) => warn!(
                "Channel '{}': signal type '{}' is not supported and will be skipped",
                channel.name, name
            ),
            _ => {}
        }
    }

    Ok(())
}
