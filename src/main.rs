// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the Modbus PLC/sensor simulator

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use modbus_simulator::config::{self, Config};
use modbus_simulator::modbus::ModbusTcpTransport;
use modbus_simulator::simulation::SimulatorEngine;

/// PLC/sensor simulator exposing synthetic signals as Modbus TCP holding registers
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Modbus server address
    #[arg(long)]
    address: Option<String>,

    /// Modbus server port
    #[arg(long)]
    port: Option<u16>,

    /// Delay between two updates, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log a summary and append a CSV record on every update
    #[arg(long)]
    logging: Option<bool>,

    /// CSV record file
    #[arg(long)]
    log_file: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    config.apply_args(
        args.address.clone(),
        args.port,
        args.interval_ms,
        args.logging,
        args.log_file.clone(),
    );
    config::validate_specific_rules(&config)?;

    let transport = ModbusTcpTransport::new(config.modbus.register_count);
    let mut engine = SimulatorEngine::new(&config, transport);
    engine.start().await?;

    println!("Press Ctrl+C or type 'q' then Enter to stop the simulator");
    let exit = wait_for_exit().await;

    engine.stop().await;
    exit
}

/// Resolve on Ctrl+C or when a line reading `q` is entered on stdin.
async fn wait_for_exit() -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            res = signal::ctrl_c() => {
                res?;
                info!("Received shutdown signal, stopping simulator");
                return Ok(());
            }
            line = lines.next_line() => match line? {
                Some(line) if line.trim().eq_ignore_ascii_case("q") => {
                    info!("Exit requested from console, stopping simulator");
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    // stdin closed (e.g. running detached): only Ctrl+C remains
                    signal::ctrl_c().await?;
                    info!("Received shutdown signal, stopping simulator");
                    return Ok(());
                }
            }
        }
    }
}
