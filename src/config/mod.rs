// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the Modbus simulator
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the simulator. The configuration is backed by a
//! YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! The application's configuration is organized as a nested structure with sections:
//! - `modbus`: Settings for the Modbus TCP server (endpoint and register map size)
//! - `simulation`: Sampling interval and the ordered channel list
//! - `telemetry`: Console summary and CSV record settings
//!
//! ## Usage
//!
//! ```no_run
//! use modbus_simulator::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some("0.0.0.0".to_string()), // Modbus address
//!     Some(5020),                  // Modbus port
//!     Some(500),                   // Sampling interval (ms)
//!     Some(false),                 // Telemetry enabled
//!     None,                        // Telemetry file
//! );
//!
//! // Access configuration values
//! println!("Modbus port: {}", config.modbus.port);
//! ```

pub mod modbus;
pub mod simulation;
pub mod telemetry;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use modbus::ModbusConfig;
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;
pub use utils::{is_valid_ip_address, output_config_schema, validate_specific_rules};

/// Configuration schema embedded at build time
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure for the simulator.
///
/// # Structure
///
/// The configuration is designed to be deserialized from and serialized to YAML
/// using the serde framework. The structure is validated against a JSON schema
/// to ensure all fields have valid types and values.
///
/// # Default Values
///
/// Each section uses default values when not explicitly specified in the configuration
/// file. An empty file therefore starts the two sample channels on
/// `127.0.0.1:50200`, ticking every second.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Modbus TCP server settings.
    #[serde(default)]
    pub modbus: ModbusConfig,

    /// Sampling interval and simulated channels.
    ///
    /// Channels are evaluated in the order they appear in the file.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Per-tick console summary and CSV record.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        // Create parent directories if they don't exist
        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. When the file
    /// fails schema validation, deserialization or [`validate_specific_rules`],
    /// a `<name>.sample.yaml` file with the defaults is written next to it and
    /// an error is returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // An empty document is the default configuration
        let yaml_value: serde_yml::Value = if contents.trim().is_empty() {
            serde_yml::Value::Mapping(Default::default())
        } else {
            serde_yml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?
        };

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_yml::from_value(yaml_value) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only the values that are provided override the existing configuration.
    ///
    /// # Parameters
    ///
    /// * `modbus_address` - Network address for the Modbus server to bind to
    /// * `modbus_port` - TCP port for the Modbus server
    /// * `sampling_interval_ms` - Delay between two ticks, in milliseconds
    /// * `telemetry_enabled` - Enable or disable the per-tick summary and CSV record
    /// * `telemetry_file` - Path of the CSV record file
    pub fn apply_args(
        &mut self,
        modbus_address: Option<String>,
        modbus_port: Option<u16>,
        sampling_interval_ms: Option<u64>,
        telemetry_enabled: Option<bool>,
        telemetry_file: Option<String>,
    ) {
        if let Some(address) = modbus_address {
            debug!("Overriding Modbus address from command line: {}", address);
            self.modbus.address = address;
        }
        if let Some(port) = modbus_port {
            debug!("Overriding Modbus port from command line: {}", port);
            self.modbus.port = port;
        }
        if let Some(interval) = sampling_interval_ms {
            debug!("Overriding sampling interval from command line: {}", interval);
            self.simulation.sampling_interval_ms = interval;
        }
        if let Some(enabled) = telemetry_enabled {
            debug!("Overriding telemetry enabled from command line: {}", enabled);
            self.telemetry.enabled = enabled;
        }
        if let Some(file) = telemetry_file {
            debug!("Overriding telemetry file from command line: {}", file);
            self.telemetry.file_name = file;
        }
    }
}
