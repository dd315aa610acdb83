// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Telemetry configuration

use serde::{Deserialize, Serialize};

/// Settings for the per-tick console summary and CSV record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// When false, ticks neither log a summary line nor touch the record file.
    pub enabled: bool,

    /// CSV file the records are appended to.
    pub file_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: "Log.csv".to_string(),
        }
    }
}
