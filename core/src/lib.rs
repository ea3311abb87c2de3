/*
 * lib.rs
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

//! Event-driven HTTP/1.1 client engine.
//!
//! The transport (socket, DNS, event loop) lives outside the engine and talks to
//! it through the `Transport` trait plus the client's `handle_*` entry points.
//! `QueuedTransport` lets a host perform the I/O itself; `net::TcpDriver` does
//! it with tokio.

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod transport;

pub use config::ClientConfig;
pub use error::{HttpError, ParseError};
pub use http::{AsyncHttpClient, Completion, Method, ParseState, Request, Response, TerminationReason};
pub use transport::{Destination, Host, QueuedTransport, Transport, TransportCommand};
