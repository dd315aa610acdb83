// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulation engine
//!
//! The [`SimulatorEngine`] owns the channel list, the global step counter,
//! the strategy table and the background task that refreshes the holding
//! registers on a fixed cadence.
//!
//! ## Lifecycle
//!
//! ```text
//! Stopped --start()--> Running --stop()--> Stopped
//! ```
//!
//! `start()` validates the channels, binds the transport and spawns the loop.
//! `stop()` clears the running flag, waits [`STOP_GRACE_PERIOD`], then cancels
//! the loop at its sleep point and releases the transport. A stopped engine
//! can be started again; the step counter resumes where it left off.
//!
//! ## Tick
//!
//! Every tick evaluates all channels against the same step, in declaration
//! order, writes each result into the register map, emits a console summary
//! and a telemetry record, and finally advances the step by one.

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio::time;

use super::channel::Channel;
use super::error::SimulationError;
use super::strategy::StrategyTable;
use super::validate_channels;
use crate::config::Config;
use crate::modbus::{ModbusTcpTransport, RegisterMap, RegisterTransport};
use crate::utility::noise_generator::NoiseGenerator;
use crate::utility::telemetry_sink::{TelemetrySink, TIMESTAMP_FORMAT};

/// Delay between clearing the running flag and cancelling the loop.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// Upper bound on waiting for the cancelled loop task to finish.
const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Mutable run state shared between the engine and its background task.
struct SimulationState {
    channels: Vec<Channel>,
    global_step: f64,
    strategies: StrategyTable,
    noise: NoiseGenerator,
}

/// Everything a tick needs, cheap to clone into the background task.
#[derive(Clone)]
struct TickContext {
    state: Arc<Mutex<SimulationState>>,
    registers: RegisterMap,
    sink: TelemetrySink,
    logging: bool,
}

impl TickContext {
    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        // A panicking tick leaves the state consistent: values are only
        // committed per channel and the step is advanced last.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Evaluate every channel at the current step and advance the step.
    ///
    /// Returns the evaluated step with the summary and values to report, or
    /// `None` when logging is off. The state lock is released on return, so
    /// reporting never holds it.
    fn evaluate(&self) -> (f64, Option<(String, Vec<i16>)>) {
        let mut guard = self.lock();
        let SimulationState {
            channels,
            global_step,
            strategies,
            noise,
        } = &mut *guard;
        let step = *global_step;

        for channel in channels.iter_mut() {
            match strategies.calculate(channel, step, noise) {
                Ok(value) => {
                    channel.current_value = value;
                    if !self.registers.set(channel.address, value) {
                        error!(
                            "Failed to write channel '{}' to register {}: address out of range",
                            channel.name, channel.address
                        );
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }

        let report = self.logging.then(|| {
            let summary = channels
                .iter()
                .map(|c| format!("{}: {:.1}", c.name, c.scaled_value()))
                .collect::<Vec<_>>()
                .join(" | ");
            let values = channels.iter().map(|c| c.current_value).collect();
            (summary, values)
        });

        // Advanced under the same lock so two ticks never share a step
        *global_step += 1.0;
        (step, report)
    }

    fn tick(&self) {
        let (step, report) = self.evaluate();

        if let Some((summary, values)) = report {
            let now = Local::now();
            info!("[{}] {} | Step: {}", now.format("%H:%M:%S"), summary, step);
            self.sink.record(now.naive_local(), &values, step);
        }
    }
}

/// Run `tick` every `interval` until `running` is cleared.
///
/// A panicking tick is logged and the loop carries on. Ticks run inline on the
/// task: the only suspension point is the sleep, which is what lets `stop()`
/// cancel the loop without cutting a tick short. Each tick is a few register
/// writes and at most one short file append.
async fn run_loop<F>(running: Arc<AtomicBool>, interval: Duration, tick: F)
where
    F: Fn(),
{
    info!("Background loop started");
    while running.load(Ordering::SeqCst) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(&tick)) {
            error!("Simulation tick failed: {}", panic_message(payload.as_ref()));
        }
        time::sleep(interval).await;
    }
    debug!("Background loop observed stop request");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Drives a set of channels and publishes them through a [`RegisterTransport`].
///
/// # Example
///
/// ```no_run
/// use modbus_simulator::config::Config;
/// use modbus_simulator::modbus::ModbusTcpTransport;
/// use modbus_simulator::simulation::SimulatorEngine;
///
/// # async fn run() -> anyhow::Result<()> {
/// let config = Config::default();
/// let transport = ModbusTcpTransport::new(config.modbus.register_count);
/// let mut engine = SimulatorEngine::new(&config, transport);
///
/// let bound = engine.start().await?;
/// println!("Simulator listening on {}", bound);
/// // ... wait for a shutdown signal ...
/// engine.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct SimulatorEngine<T: RegisterTransport = ModbusTcpTransport> {
    address: String,
    port: u16,
    sampling_interval: Duration,
    transport: T,
    context: TickContext,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<T: RegisterTransport> SimulatorEngine<T> {
    /// Engine whose jitter source is seeded from the system time
    pub fn new(config: &Config, transport: T) -> Self {
        Self::with_noise(config, transport, NoiseGenerator::new_from_system_time())
    }

    /// Engine with a reproducible jitter sequence
    pub fn with_seed(config: &Config, transport: T, seed: u64) -> Self {
        Self::with_noise(config, transport, NoiseGenerator::new(seed))
    }

    fn with_noise(config: &Config, transport: T, noise: NoiseGenerator) -> Self {
        let state = SimulationState {
            channels: config.simulation.channels.clone(),
            global_step: 0.0,
            strategies: StrategyTable::new(),
            noise,
        };
        let context = TickContext {
            state: Arc::new(Mutex::new(state)),
            registers: transport.registers(),
            sink: TelemetrySink::from_config(&config.telemetry),
            logging: config.telemetry.enabled,
        };

        Self {
            address: config.modbus.address.clone(),
            port: config.modbus.port,
            sampling_interval: Duration::from_millis(config.simulation.sampling_interval_ms),
            transport,
            context,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Validate the channels, bind the transport and launch the update loop.
    ///
    /// Returns the address the transport is actually bound to, which differs
    /// from the configured one when port 0 is requested.
    ///
    /// # Errors
    ///
    /// - a [`SimulationError`] when the interval or a channel is invalid
    /// - the transport error when binding fails
    /// - an error when the engine is already running
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.is_running() {
            anyhow::bail!("Simulation engine is already running");
        }
        if self.sampling_interval.is_zero() {
            return Err(SimulationError::InvalidInterval.into());
        }

        let channels = self.channels();
        validate_channels(&channels, self.context.registers.capacity())?;

        let endpoint = tokio::net::lookup_host((self.address.as_str(), self.port))
            .await
            .with_context(|| format!("Failed to resolve {}:{}", self.address, self.port))?
            .next()
            .with_context(|| format!("No address found for {}:{}", self.address, self.port))?;

        let bound = self.transport.start(endpoint).await?;

        info!(
            "Modbus simulator started on {} with {} channel(s) at {}",
            bound,
            channels.len(),
            Local::now().format(TIMESTAMP_FORMAT)
        );
        for channel in &channels {
            info!(
                "{} | Addr: {} | {}",
                channel.name,
                channel.address,
                channel.range_display()
            );
        }

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let context = self.context.clone();
        let interval = self.sampling_interval;
        self.task = Some(tokio::spawn(run_loop(running, interval, move || {
            context.tick()
        })));

        Ok(bound)
    }

    /// Stop the update loop and release the transport.
    ///
    /// An in-flight tick always completes. Once this returns, no register or
    /// telemetry write happens until the next `start()`.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Simulation engine is not running");
            return;
        }

        time::sleep(STOP_GRACE_PERIOD).await;

        if let Some(task) = self.task.take() {
            task.abort();
            match time::timeout(TASK_JOIN_TIMEOUT, task).await {
                Ok(_) => info!("Background loop gracefully stopped"),
                Err(_) => warn!("Background loop did not stop in time"),
            }
        }

        self.transport.stop().await;
        info!("Modbus server stopped");
    }

    /// Run one tick synchronously on the calling thread.
    ///
    /// Used by the background loop; also handy to drive the simulation
    /// deterministically without starting the transport.
    pub fn tick(&self) {
        self.context.tick();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Step that the next tick will evaluate
    pub fn global_step(&self) -> f64 {
        self.context.lock().global_step
    }

    /// Snapshot of the channels with their latest values
    pub fn channels(&self) -> Vec<Channel> {
        self.context.lock().channels.clone()
    }

    /// Register map the channels are written into
    pub fn registers(&self) -> RegisterMap {
        self.context.registers.clone()
    }

    pub fn sampling_interval(&self) -> Duration {
        self.sampling_interval
    }
}

impl<T: RegisterTransport> Drop for SimulatorEngine<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
