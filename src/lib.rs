// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus PLC/sensor simulator library
//!
//! This library generates synthetic, time-varying signals (sine waves and
//! ramps) and publishes them as Modbus TCP holding registers, so that SCADA
//! displays and Modbus masters can be developed without physical hardware.

pub mod config;
pub mod modbus;
pub mod simulation;
pub mod utility;
