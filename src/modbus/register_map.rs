// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared holding-register buffer
//!
//! The [`RegisterMap`] is a fixed-capacity array of 16-bit registers shared
//! between the simulation loop (writer) and the Modbus service (reader and
//! occasional writer on behalf of clients). Clones share the same storage.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_modbus::prelude::ExceptionCode;

/// Default number of holding registers (Modbus addresses 0-9999).
pub const DEFAULT_REGISTER_COUNT: usize = 10_000;

/// Fixed-size, thread-safe holding register buffer.
///
/// Signed values are stored using their two's-complement bit pattern, which is
/// how a Modbus client receives a `short` register.
#[derive(Debug, Clone)]
pub struct RegisterMap {
    registers: Arc<Mutex<Vec<u16>>>,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTER_COUNT)
    }
}

impl RegisterMap {
    /// Create a zero-filled map holding `capacity` registers
    pub fn new(capacity: usize) -> Self {
        Self {
            registers: Arc::new(Mutex::new(vec![0; capacity])),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u16>> {
        // A panic while holding the lock cannot leave a Vec<u16> half-written
        self.registers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of addressable registers
    pub fn capacity(&self) -> usize {
        self.lock().len()
    }

    /// Read one register as a signed value
    pub fn get(&self, address: u16) -> Option<i16> {
        self.lock().get(usize::from(address)).map(|r| *r as i16)
    }

    /// Write one signed value. Returns `false` when `address` is out of range.
    pub fn set(&self, address: u16, value: i16) -> bool {
        match self.lock().get_mut(usize::from(address)) {
            Some(register) => {
                *register = value as u16;
                true
            }
            None => false,
        }
    }

    /// Read `count` raw registers starting at `address`
    pub fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, ExceptionCode> {
        let registers = self.lock();
        let start = usize::from(address);
        let end = start + usize::from(count);
        registers
            .get(start..end)
            .map(<[u16]>::to_vec)
            .ok_or(ExceptionCode::IllegalDataAddress)
    }

    /// Write raw registers starting at `address`; nothing is written if any
    /// target is out of range
    pub fn write(&self, address: u16, values: &[u16]) -> Result<(), ExceptionCode> {
        let mut registers = self.lock();
        let start = usize::from(address);
        let end = start + values.len();
        let target = registers
            .get_mut(start..end)
            .ok_or(ExceptionCode::IllegalDataAddress)?;
        target.copy_from_slice(values);
        Ok(())
    }

    /// Copy of the whole buffer
    pub fn snapshot(&self) -> Vec<u16> {
        self.lock().clone()
    }
}
