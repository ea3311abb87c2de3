/*
 * transport.rs
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

//! Transport seam: what the client needs from the connection owner.
//!
//! The transport owns the socket. The client asks it to connect, send and
//! close; the transport reports back by calling the client's `handle_*`
//! entry points (connect, data, disconnect, timeout, error).

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::net::IpAddr;

use bytes::Bytes;

/// Remote host: a name to resolve, or a literal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Name(String),
    Address(IpAddr),
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Name(name) => write!(f, "{}", name),
            Host::Address(IpAddr::V6(addr)) => write!(f, "[{}]", addr),
            Host::Address(addr) => write!(f, "{}", addr),
        }
    }
}

/// Where requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: Host,
    pub port: u16,
}

impl Destination {
    pub fn new(host: Host, port: u16) -> Self {
        Self { host, port }
    }

    /// Value for the Host request header; the port is omitted when it is 80.
    pub fn authority(&self) -> String {
        if self.port == 80 {
            self.host.to_string()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Connection operations the client requires.
pub trait Transport {
    fn is_connected(&self) -> bool;

    /// Start connecting. Completion is reported through the client's `handle_connect`.
    fn connect(&mut self, destination: &Destination);

    /// Best-effort write of raw bytes.
    fn send(&mut self, data: Bytes) -> io::Result<()>;

    /// Ask for the connection to be shut down.
    fn close(&mut self) {}
}

/// An action the client asked the transport to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Connect(Destination),
    Send(Bytes),
    Close,
}

/// Transport that records commands for the host to carry out.
///
/// The host pops commands with `next_command`, performs them on its own
/// socket, calls `set_connected` as connectivity changes, and reports events
/// back to the client.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    connected: bool,
    commands: VecDeque<TransportCommand>,
}

impl QueuedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn next_command(&mut self) -> Option<TransportCommand> {
        self.commands.pop_front()
    }

    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }
}

impl Transport for QueuedTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self, destination: &Destination) {
        self.commands
            .push_back(TransportCommand::Connect(destination.clone()));
    }

    fn send(&mut self, data: Bytes) -> io::Result<()> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
        }
        self.commands.push_back(TransportCommand::Send(data));
        Ok(())
    }

    fn close(&mut self) {
        self.commands.push_back(TransportCommand::Close);
    }
}
