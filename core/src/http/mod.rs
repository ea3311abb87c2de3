/*
 * mod.rs
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

//! HTTP client: event-driven HTTP/1.1 with push-parsed responses.
//!
//! Design:
//! - Callback slots for the caller: `on_response` (headers complete), `on_data` (body chunk), `on_complete`, `on_error`.
//! - Buffers: `bytes` crate (BytesMut for the partial-line buffer and request serialization, Bytes for bodies).
//! - HTTP/1.1 only: state-machine response parser; the body is read until the connection closes.
//! - The transport is a trait; the client never blocks and owns no socket.

mod handler;
mod request;
mod response;

pub mod client;
pub mod h1;

pub use client::AsyncHttpClient;
pub use h1::{H1ResponseHandler, ParseState, ResponseParser, TerminationReason};
pub use handler::{Callbacks, CompleteHandler, DataHandler, ErrorHandler, ResponseHandler};
pub use request::{Body, Method, Request};
pub use response::{Completion, Response};
