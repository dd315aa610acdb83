// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus communication module
//!
//! This module exposes the simulated channel values to external systems as
//! Modbus TCP holding registers.
//!
//! ## Key Components
//!
//! - [`RegisterMap`]: the shared, fixed-size holding register buffer.
//! - [`RegisterTransport`]: what the simulation engine needs from a transport.
//! - [`ModbusTcpTransport`]: the `tokio-modbus` backed implementation.
//!
//! ## Usage
//!
//! ```no_run
//! use modbus_simulator::modbus::{ModbusTcpTransport, RegisterTransport};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut transport = ModbusTcpTransport::new(100);
//! let bound = transport.start("127.0.0.1:50200".parse()?).await?;
//! transport.registers().set(0, 250);
//! println!("Serving on {}", bound);
//! transport.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Register Map
//!
//! Each configured channel owns the holding register at its `address`. The
//! register carries the channel value in deci-units as a signed 16-bit
//! integer (250 reads as 25.0). Registers that no channel owns stay at 0
//! unless a client writes them.

pub mod modbus_server;
pub mod register_map;

pub use modbus_server::{ModbusTcpTransport, RegisterMapService, RegisterTransport};
pub use register_map::{RegisterMap, DEFAULT_REGISTER_COUNT};
