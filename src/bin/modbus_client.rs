// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Duration;
use tokio_modbus::prelude::*;

/// Modbus client for reading holding registers from a running simulator
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Modbus server address
    #[clap(long, default_value = "127.0.0.1")]
    address: String,

    /// Modbus server port
    #[clap(long, default_value = "50200")]
    port: u16,

    /// Starting holding register address
    #[clap(long, default_value = "0")]
    holding_register: u16,

    /// Number of registers to read
    #[clap(long, default_value = "2")]
    quantity: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let socket_addr = tokio::net::lookup_host((args.address.as_str(), args.port))
        .await?
        .next()
        .with_context(|| format!("No address found for {}:{}", args.address, args.port))?;
    println!("Connecting to Modbus server at {}", socket_addr);

    let mut ctx = tcp::connect_slave(socket_addr, Slave(1)).await?;

    println!(
        "Reading {} holding registers starting at address {}",
        args.quantity, args.holding_register
    );
    let response = tokio::time::timeout(
        Duration::from_secs(1),
        ctx.read_holding_registers(args.holding_register, args.quantity),
    )
    .await
    .context("Modbus request timed out")???;

    println!("Raw register values: {:?}", response);

    // Channels store signed deci-units
    for (i, value) in response.iter().enumerate() {
        let register = args.holding_register + i as u16;
        println!(
            "Register {}: raw = {}, value = {:.1}",
            register,
            value,
            f64::from(*value as i16) / 10.0
        );
    }

    Ok(())
}
