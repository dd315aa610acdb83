// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus server implementation for the register simulator
//!
//! For avoiding confusion with the Modbus master/slave terminology, this module uses
//! the terms "server" and "client" instead. The server is the device that provides data,
//! while the client is the device that requests data.
//!
//! The Modbus master is the device that requests data, while the Modbus slave is the device
//! that provides data. In other words, the Modbus master is here the client and the
//! Modbus slave is here the server.
//!
//! ## Supported Function Codes
//!
//! | Code | Function | Notes |
//! |------|----------|-------|
//! | 0x03 | Read Holding Registers | Simulated channel values |
//! | 0x06 | Write Single Register | Overwritten again on the next tick if a channel owns it |
//! | 0x10 | Write Multiple Registers | Same as above |
//!
//! Any other function code is answered with `IllegalFunction`, and any access
//! outside the register map with `IllegalDataAddress`.

use std::{future, net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tokio_modbus::{
    prelude::*,
    server::tcp::{accept_tcp_connection, Server},
};

use super::register_map::RegisterMap;

/// The transport a simulation engine publishes its registers through.
///
/// The engine only ever binds, releases and writes the register map; framing
/// and client handling belong to the implementation.
#[async_trait]
pub trait RegisterTransport: Send + Sync {
    /// Bind to `endpoint` and start serving. Returns the address actually bound.
    async fn start(&mut self, endpoint: SocketAddr) -> Result<SocketAddr>;

    /// Release the binding. Calling it while stopped is a no-op.
    async fn stop(&mut self);

    /// Shared view of the holding registers
    fn registers(&self) -> RegisterMap;
}

/// `tokio-modbus` service answering requests from a [`RegisterMap`].
///
/// One instance is created per client connection; all of them share the same
/// underlying registers.
#[derive(Debug, Clone)]
pub struct RegisterMapService {
    registers: RegisterMap,
}

impl RegisterMapService {
    pub fn new(registers: RegisterMap) -> Self {
        Self { registers }
    }
}

impl tokio_modbus::server::Service for RegisterMapService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);

        let res = match req {
            Request::ReadHoldingRegisters(addr, cnt) => {
                debug!(
                    "Reading {} holding registers starting from address {}",
                    cnt, addr
                );
                self.registers
                    .read(addr, cnt)
                    .map(Response::ReadHoldingRegisters)
            }
            Request::WriteMultipleRegisters(addr, values) => {
                debug!(
                    "Writing {} values to holding registers starting from address {}",
                    values.len(),
                    addr
                );
                self.registers
                    .write(addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            Request::WriteSingleRegister(addr, value) => {
                debug!("Writing value {} to holding register {}", value, addr);
                self.registers
                    .write(addr, std::slice::from_ref(&value))
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}

/// Modbus TCP transport serving a [`RegisterMap`] with `tokio-modbus`.
pub struct ModbusTcpTransport {
    registers: RegisterMap,
    server_task: Option<JoinHandle<()>>,
}

impl ModbusTcpTransport {
    /// Transport owning a fresh map of `register_count` holding registers
    pub fn new(register_count: usize) -> Self {
        Self::with_registers(RegisterMap::new(register_count))
    }

    /// Transport serving an existing map
    pub fn with_registers(registers: RegisterMap) -> Self {
        Self {
            registers,
            server_task: None,
        }
    }

    pub fn is_serving(&self) -> bool {
        self.server_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl RegisterTransport for ModbusTcpTransport {
    async fn start(&mut self, endpoint: SocketAddr) -> Result<SocketAddr> {
        if self.is_serving() {
            anyhow::bail!("Modbus server is already running");
        }

        let listener = TcpListener::bind(endpoint)
            .await
            .with_context(|| format!("Failed to bind Modbus server to {}", endpoint))?;
        let local_addr = listener.local_addr()?;
        let server = Server::new(listener);

        let registers = self.registers.clone();
        let on_connected = move |stream: TcpStream, socket_addr: SocketAddr| {
            let registers = registers.clone();
            async move {
                debug!("Modbus client connected: {}", socket_addr);
                accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                    Ok(Some(RegisterMapService::new(registers.clone())))
                })
            }
        };

        let on_process_error = |err: std::io::Error| {
            error!("Modbus server error: {err}");
        };

        self.server_task = Some(tokio::spawn(async move {
            if let Err(e) = server.serve(&on_connected, on_process_error).await {
                error!("Modbus server error: {}", e);
            }
        }));

        info!("Modbus server listening on {}", local_addr);
        Ok(local_addr)
    }

    async fn stop(&mut self) {
        let Some(server_handle) = self.server_task.take() else {
            return;
        };

        info!("Shutting down Modbus server...");
        server_handle.abort();

        match tokio::time::timeout(Duration::from_secs(5), server_handle).await {
            Ok(_) => info!("Modbus server shut down successfully"),
            Err(_) => warn!("Modbus server shutdown timed out, forcing termination"),
        }
    }

    fn registers(&self) -> RegisterMap {
        self.registers.clone()
    }
}

impl Drop for ModbusTcpTransport {
    fn drop(&mut self) {
        // Aborting the accept loop drops the listener and frees the port
        if let Some(server_handle) = self.server_task.take() {
            server_handle.abort();
        }
    }
}
