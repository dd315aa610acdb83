// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP server configuration
//!
//! This module defines the structures for configuring the Modbus TCP server
//! that publishes the simulated channels.

use serde::{Deserialize, Serialize};

use crate::modbus::DEFAULT_REGISTER_COUNT;

/// Configuration for the Modbus TCP server component.
///
/// # Fields
///
/// * `address` - Network address for the Modbus server to bind to (default: 127.0.0.1)
/// * `port` - TCP port number for the Modbus server (default: 50200)
/// * `register_count` - Number of holding registers exposed (default: 10000)
///
/// # Example
///
/// ```
/// use modbus_simulator::config::ModbusConfig;
///
/// let modbus_config = ModbusConfig {
///     address: "0.0.0.0".to_string(),
///     port: 502,
///     register_count: 100,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModbusConfig {
    /// The network address the Modbus server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or a hostname. Default is "127.0.0.1".
    /// Use "0.0.0.0" to bind to all IPv4 interfaces.
    pub address: String,

    /// The TCP port the Modbus server will listen on.
    ///
    /// Valid range is 1-65534. The default stays clear of the privileged
    /// standard port 502 so the simulator runs without elevated rights.
    pub port: u16,

    /// Size of the holding register map. Every channel address must be below it.
    pub register_count: usize,
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 50200,
            register_count: DEFAULT_REGISTER_COUNT,
        }
    }
}
