// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Lifecycle tests for the SimulatorEngine
//!
//! The engine is started on an OS-assigned port with a short sampling interval,
//! observed through a real Modbus client and the telemetry file, then stopped.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::time;
use tokio_modbus::prelude::*;

use modbus_simulator::config::Config;
use modbus_simulator::modbus::ModbusTcpTransport;
use modbus_simulator::simulation::{Channel, SimulationError, SimulatorEngine};

/// Default channels on an OS-assigned port, ticking every 50 ms
fn test_config(telemetry_file: &Path, telemetry_enabled: bool) -> Config {
    let mut config = Config::default();
    config.modbus.port = 0;
    config.modbus.register_count = 32;
    config.simulation.sampling_interval_ms = 50;
    config.telemetry.enabled = telemetry_enabled;
    config.telemetry.file_name = telemetry_file.to_string_lossy().to_string();
    config
}

fn engine_for(config: &Config) -> SimulatorEngine<ModbusTcpTransport> {
    let transport = ModbusTcpTransport::new(config.modbus.register_count);
    SimulatorEngine::with_seed(config, transport, 7)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_start_serves_values_and_stop_halts_writes() -> Result<()> {
    let temp_dir = tempdir()?;
    let log_path = temp_dir.path().join("Log.csv");
    let config = test_config(&log_path, true);
    let mut engine = engine_for(&config);

    let bound = engine.start().await?;
    assert!(engine.is_running());
    time::sleep(Duration::from_millis(300)).await;

    // Live values are visible to a Modbus client
    let mut ctx = tcp::connect(bound).await?;
    let data = ctx.read_holding_registers(0, 2).await??;
    assert_eq!(data.len(), 2);
    assert!((200..=300).contains(&data[0]));
    assert_eq!(data[1] % 100, 0);
    assert!(data[1] < 1000);
    ctx.disconnect().await?;

    engine.stop().await;
    assert!(!engine.is_running());

    let lines = read_lines(&log_path);
    let registers = engine.registers().snapshot();
    let step = engine.global_step();
    assert!(!lines.is_empty());
    assert_eq!(lines.len() as f64, step);

    // Nothing is written after stop() returns
    time::sleep(Duration::from_millis(200)).await;
    assert_eq!(read_lines(&log_path), lines);
    assert_eq!(engine.registers().snapshot(), registers);
    assert_eq!(engine.global_step(), step);

    // timestamp, one value per channel, then the step
    for (expected_step, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4, "unexpected record: {}", line);
        assert_eq!(fields[0].len(), "yyyy-MM-dd HH:mm:ss".len());
        assert!(chrono::NaiveDateTime::parse_from_str(fields[0], "%Y-%m-%d %H:%M:%S").is_ok());
        fields[1].parse::<i16>()?;
        assert_eq!(
            fields[2].parse::<i16>()?,
            (expected_step as i16 % 10) * 100
        );
        assert_eq!(fields[3], expected_step.to_string());
    }

    Ok(())
}

#[tokio::test]
async fn test_transport_is_released_on_stop() -> Result<()> {
    let temp_dir = tempdir()?;
    let config = test_config(&temp_dir.path().join("Log.csv"), false);
    let mut engine = engine_for(&config);

    let bound = engine.start().await?;
    engine.stop().await;

    // The endpoint is free again
    let rebound = TcpListener::bind(bound).await?;
    assert_eq!(rebound.local_addr()?, bound);
    Ok(())
}

#[tokio::test]
async fn test_bind_failure_is_fatal() -> Result<()> {
    let occupied = TcpListener::bind("127.0.0.1:0").await?;
    let temp_dir = tempdir()?;
    let mut config = test_config(&temp_dir.path().join("Log.csv"), true);
    config.modbus.port = occupied.local_addr()?.port();

    let mut engine = engine_for(&config);
    assert!(engine.start().await.is_err());
    assert!(!engine.is_running());
    assert_eq!(engine.global_step(), 0.0);
    assert!(!temp_dir.path().join("Log.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_address_is_fatal() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut config = test_config(&temp_dir.path().join("Log.csv"), true);
    config
        .simulation
        .channels
        .push(Channel::ramp("Far", 32, 0.0, 10.0, 1.0));

    let mut engine = engine_for(&config);
    let err = engine.start().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<SimulationError>(),
        Some(&SimulationError::AddressOutOfRange {
            channel: "Far".to_string(),
            address: 32,
            capacity: 32,
        })
    );
    assert!(!engine.is_running());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_address_is_fatal() -> Result<()> {
    let temp_dir = tempdir()?;
    let mut config = test_config(&temp_dir.path().join("Log.csv"), true);
    config
        .simulation
        .channels
        .push(Channel::ramp("Shadow", 1, 0.0, 10.0, 1.0));

    let mut engine = engine_for(&config);
    let err = engine.start().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<SimulationError>(),
        Some(&SimulationError::DuplicateAddress {
            address: 1,
            first: "Ramp_Sample".to_string(),
            second: "Shadow".to_string(),
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_disabled_telemetry_writes_nothing() -> Result<()> {
    let temp_dir = tempdir()?;
    let log_path = temp_dir.path().join("Log.csv");
    let config = test_config(&log_path, false);
    let mut engine = engine_for(&config);

    engine.start().await?;
    time::sleep(Duration::from_millis(150)).await;
    engine.stop().await;

    assert!(engine.global_step() >= 1.0);
    assert!(!log_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_unwritable_telemetry_does_not_stop_the_loop() -> Result<()> {
    // A directory where the CSV file should be makes every append fail
    let temp_dir = tempdir()?;
    let blocked_path = temp_dir.path().join("Log.csv");
    fs::create_dir(&blocked_path)?;
    let config = test_config(&blocked_path, true);
    let mut engine = engine_for(&config);

    engine.start().await?;
    time::sleep(Duration::from_millis(120)).await;
    let early_step = engine.global_step();
    time::sleep(Duration::from_millis(250)).await;
    let late_step = engine.global_step();
    let ramp = engine.registers().get(1);
    engine.stop().await;

    assert!(early_step >= 1.0);
    assert!(late_step > early_step);
    assert_eq!(ramp, Some(((late_step as i16 - 1) % 10) * 100));
    assert!(blocked_path.is_dir());
    Ok(())
}

#[test]
fn test_default_channel_scenarios() {
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir.path().join("Log.csv"), false);
    let engine = engine_for(&config);

    // Steps 0 through 12
    for _ in 0..13 {
        engine.tick();
    }
    assert_eq!(engine.registers().get(1), Some(200));

    // Steps 13 through 15
    for _ in 0..3 {
        engine.tick();
    }
    assert_eq!(engine.registers().get(0), Some(300));

    let channels = engine.channels();
    assert_eq!(channels[0].current_value, 300);
    assert!((channels[0].scaled_value() - 30.0).abs() < 1e-9);
    assert_eq!(engine.global_step(), 16.0);
}
