// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use modbus_simulator::config::{Config, ModbusConfig, SimulationConfig, TelemetryConfig};
use modbus_simulator::simulation::{Channel, SignalType};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_and_save() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let config = Config {
        modbus: ModbusConfig {
            address: "192.168.1.1".to_string(),
            port: 5020,
            register_count: 100,
        },
        simulation: SimulationConfig {
            sampling_interval_ms: 250,
            channels: vec![
                Channel::sine("Boiler_Temp", 10, 650.0, 20.0, 120.0).with_noise(2),
                Channel::ramp("Tank_Level", 11, 0.0, 500.0, 5.0),
            ],
        },
        telemetry: TelemetryConfig {
            enabled: false,
            file_name: "records.csv".to_string(),
        },
    };

    config.save_to_file(&config_path)?;
    let loaded_config = Config::from_file(&config_path)?;

    assert_eq!(loaded_config.modbus.address, "192.168.1.1");
    assert_eq!(loaded_config.modbus.port, 5020);
    assert_eq!(loaded_config.modbus.register_count, 100);
    assert_eq!(loaded_config.simulation.sampling_interval_ms, 250);
    assert_eq!(loaded_config.simulation.channels, config.simulation.channels);
    assert!(!loaded_config.telemetry.enabled);
    assert_eq!(loaded_config.telemetry.file_name, "records.csv");

    Ok(())
}

#[test]
fn test_missing_file_creates_defaults() -> Result<()> {
    let temp_dir = tempdir()?;
    let non_existent_path = temp_dir.path().join("non_existent.yaml");
    let default_config = Config::from_file(&non_existent_path)?;

    assert!(non_existent_path.exists());
    assert_eq!(default_config.modbus.address, "127.0.0.1");
    assert_eq!(default_config.modbus.port, 50200);
    assert_eq!(default_config.modbus.register_count, 10_000);
    assert_eq!(default_config.simulation.sampling_interval_ms, 1000);
    assert!(default_config.telemetry.enabled);
    assert_eq!(default_config.telemetry.file_name, "Log.csv");

    let channels = &default_config.simulation.channels;
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].name, "Sine_Sample");
    assert_eq!(channels[0].address, 0);
    assert_eq!(channels[0].signal_type, SignalType::Sine);
    assert_eq!(channels[0].base_value, 250.0);
    assert_eq!(channels[0].amplitude, 50.0);
    assert_eq!(channels[0].period, 60.0);
    assert_eq!(channels[0].noise_range, 0);
    assert_eq!(channels[1].name, "Ramp_Sample");
    assert_eq!(channels[1].address, 1);
    assert_eq!(channels[1].signal_type, SignalType::Ramp);
    assert_eq!(channels[1].min, 0.0);
    assert_eq!(channels[1].max, 1000.0);
    assert_eq!(channels[1].step_size, 100.0);

    // The written file loads back to the same values
    let reloaded = Config::from_file(&non_existent_path)?;
    assert_eq!(reloaded.simulation.channels, default_config.simulation.channels);

    Ok(())
}

#[test]
fn test_partial_file_uses_section_defaults() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    fs::write(
        &config_path,
        r#"
modbus:
  port: 1502
simulation:
  channels:
    - name: Flow
      address: 3
      signal_type: Sine
      base_value: 120
      amplitude: 15
      period: 30
      noise_range: 2
    - name: Pump
      address: 4
      signal_type: Square
"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.modbus.port, 1502);
    assert_eq!(config.modbus.address, "127.0.0.1");
    assert_eq!(config.simulation.sampling_interval_ms, 1000);
    assert_eq!(config.simulation.channels.len(), 2);
    assert_eq!(config.simulation.channels[0].noise_range, 2);
    // Unknown signal types are kept by name and skipped at run time
    assert_eq!(
        config.simulation.channels[1].signal_type,
        SignalType::Unsupported("Square".to_string())
    );

    Ok(())
}

#[test]
fn test_empty_file_is_the_default_config() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "")?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.modbus.port, 50200);
    assert_eq!(config.simulation.channels.len(), 2);

    Ok(())
}

#[test]
fn test_apply_args() {
    let mut config = Config::default();

    config.apply_args(None, None, None, None, None);
    assert_eq!(config.modbus.port, 50200);
    assert!(config.telemetry.enabled);

    config.apply_args(
        Some("0.0.0.0".to_string()),
        Some(9000),
        Some(100),
        Some(false),
        Some("other.csv".to_string()),
    );

    assert_eq!(config.modbus.address, "0.0.0.0");
    assert_eq!(config.modbus.port, 9000);
    assert_eq!(config.simulation.sampling_interval_ms, 100);
    assert!(!config.telemetry.enabled);
    assert_eq!(config.telemetry.file_name, "other.csv");
}
