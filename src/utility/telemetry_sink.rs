// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Append-only telemetry record
//!
//! Every tick the engine hands the channel values to a [`TelemetrySink`],
//! which appends one line to a flat CSV file:
//!
//! ```text
//! 2025-06-01 14:03:27,250,0,0
//! 2025-06-01 14:03:28,255,100,1
//! ```
//!
//! The file is opened and closed on every write, so it can be rotated or
//! tailed while the simulator is running.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::{Terminator, WriterBuilder};
use log::{debug, error};

use crate::config::TelemetryConfig;

/// Timestamp layout of the first column, independent of the system locale.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV appender for per-tick channel values.
#[derive(Debug, Clone)]
pub struct TelemetrySink {
    path: PathBuf,
    enabled: bool,
}

impl TelemetrySink {
    pub fn new<P: AsRef<Path>>(path: P, enabled: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            enabled,
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(&config.file_name, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `timestamp,value1,...,valueN,step`.
    ///
    /// Does nothing when the sink is disabled or `values` is empty. Write
    /// failures are logged and never returned to the caller.
    pub fn record(&self, timestamp: NaiveDateTime, values: &[i16], step: f64) {
        if !self.enabled || values.is_empty() {
            return;
        }

        if let Err(e) = self.append(timestamp, values, step) {
            error!("Failed to write telemetry record: {:#}", e);
        }
    }

    fn append(&self, timestamp: NaiveDateTime, values: &[i16], step: f64) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open telemetry file {:?}", self.path))?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        let mut record = Vec::with_capacity(values.len() + 2);
        record.push(timestamp.format(TIMESTAMP_FORMAT).to_string());
        record.extend(values.iter().map(i16::to_string));
        record.push(step.to_string());

        writer
            .write_record(&record)
            .with_context(|| format!("Failed to append to {:?}", self.path))?;
        writer.flush()?;

        debug!("Telemetry record appended to {:?}", self.path);
        Ok(())
    }
}
