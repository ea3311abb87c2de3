/*
 * net.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of asynchttp, an event-driven HTTP/1.1 client engine.
 *
 * asynchttp is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * asynchttp is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with asynchttp.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Tokio TCP driver: performs the queued transport commands on a real socket
//! and feeds connect, data, disconnect, timeout and error events back to the client.
//!
//! One attempt runs to termination inside the caller's task; nothing is spawned,
//! so client handlers need not be `Send`.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::http::{AsyncHttpClient, ParseState};
use crate::transport::{Destination, QueuedTransport, TransportCommand};

const READ_CHUNK: usize = 8192;

/// Drives an `AsyncHttpClient<QueuedTransport>` over plain TCP.
#[derive(Default)]
pub struct TcpDriver {
    stream: Option<TcpStream>,
}

impl TcpDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the current attempt until it terminates (or until there is nothing
    /// in flight) and return the final parse state. The socket is closed on return.
    pub async fn run(&mut self, client: &mut AsyncHttpClient<QueuedTransport>) -> ParseState {
        loop {
            self.execute_commands(client).await;
            if !client.is_in_flight() {
                break;
            }
            let Some(stream) = self.stream.as_mut() else {
                debug!("request in flight without a socket");
                client.transport_mut().set_connected(false);
                client.handle_disconnect();
                continue;
            };
            let read_timeout = client.config().read_timeout();
            let mut tmp = [0u8; READ_CHUNK];
            let read = timeout(read_timeout, stream.read(&mut tmp)).await;
            match read {
                Ok(Ok(0)) => {
                    debug!("peer closed connection");
                    self.stream = None;
                    client.transport_mut().set_connected(false);
                    client.handle_disconnect();
                }
                Ok(Ok(n)) => {
                    trace!(bytes = n, "received");
                    client.handle_data(&tmp[..n]);
                }
                Ok(Err(e)) => {
                    debug!(error = %e, "read failed");
                    self.stream = None;
                    client.transport_mut().set_connected(false);
                    client.handle_error(error_code(&e));
                }
                Err(_) => client.handle_timeout(read_timeout),
            }
        }
        self.close(client).await;
        client.state()
    }

    async fn execute_commands(&mut self, client: &mut AsyncHttpClient<QueuedTransport>) {
        while let Some(command) = client.transport_mut().next_command() {
            match command {
                TransportCommand::Connect(destination) => self.connect(client, &destination).await,
                TransportCommand::Send(data) => {
                    let Some(stream) = self.stream.as_mut() else {
                        debug!(bytes = data.len(), "dropping send: not connected");
                        continue;
                    };
                    let written = match stream.write_all(&data).await {
                        Ok(()) => stream.flush().await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = written {
                        debug!(error = %e, "write failed");
                        self.stream = None;
                        client.transport_mut().set_connected(false);
                        client.handle_error(error_code(&e));
                    }
                }
                TransportCommand::Close => self.close(client).await,
            }
        }
    }

    async fn connect(&mut self, client: &mut AsyncHttpClient<QueuedTransport>, destination: &Destination) {
        let limit = client.config().connect_timeout();
        let addr = destination.to_string();
        debug!(%addr, "connecting");
        match timeout(limit, TcpStream::connect(addr.as_str())).await {
            Ok(Ok(stream)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    trace!(error = %e, "set_nodelay failed");
                }
                self.stream = Some(stream);
                client.transport_mut().set_connected(true);
                client.handle_connect();
            }
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "connect failed");
                client.handle_error(error_code(&e));
            }
            Err(_) => client.handle_timeout(limit),
        }
    }

    async fn close(&mut self, client: &mut AsyncHttpClient<QueuedTransport>) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        if let Err(e) = stream.shutdown().await {
            trace!(error = %e, "shutdown failed");
        }
        client.transport_mut().set_connected(false);
        client.handle_disconnect();
    }
}

/// OS error number when there is one, else the connection-failed code.
fn error_code(e: &io::Error) -> i32 {
    e.raw_os_error().unwrap_or(crate::error::ERROR_CONNECTION_FAILED)
}
