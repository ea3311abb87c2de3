/*
 * client.rs
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

//! HTTP client: issues one request at a time over a transport and turns
//! transport events into response, data, complete and error callbacks.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::http::h1::{H1ResponseHandler, ParseState, ResponseParser, TerminationReason};
use crate::http::handler::Callbacks;
use crate::http::request::Request;
use crate::http::response::{Completion, Response};
use crate::transport::{Destination, Transport};

/// Bridges parser callbacks to the response accumulator and the user's handlers.
struct H1Driver<'a> {
    response: &'a mut Response,
    callbacks: &'a mut Callbacks,
    retain_headers: bool,
}

impl H1ResponseHandler for H1Driver<'_> {
    fn status(&mut self, code: u16, reason: &str) {
        self.response.set_status(code, reason);
    }

    fn header(&mut self, name: &str, value: &str) {
        self.response.apply_header(name, value, self.retain_headers);
    }

    fn headers_complete(&mut self) {
        debug!(
            status = self.response.status_code,
            content_length = ?self.response.content_length,
            "response headers complete"
        );
        self.callbacks.response(&*self.response);
    }

    fn body_chunk(&mut self, data: &[u8]) {
        trace!(bytes = data.len(), "body chunk");
        self.callbacks.data(data);
    }
}

/// Event-driven HTTP/1.1 client over transport `T`.
///
/// The transport reports its events through the `handle_*` methods; these must
/// not be called concurrently. Only one request may be in flight: `get`/`post`
/// return `RequestInFlight` until the current attempt terminates.
pub struct AsyncHttpClient<T: Transport> {
    transport: T,
    destination: Destination,
    config: ClientConfig,
    parser: ResponseParser,
    response: Response,
    request: Option<Request>,
    /// Request recorded, waiting for the transport's connect event.
    connect_pending: bool,
    callbacks: Callbacks,
}

impl<T: Transport> AsyncHttpClient<T> {
    pub fn new(transport: T, destination: Destination) -> Self {
        Self::with_config(transport, destination, ClientConfig::default())
    }

    pub fn with_config(transport: T, destination: Destination, config: ClientConfig) -> Self {
        Self {
            parser: ResponseParser::new(config.max_line_length),
            transport,
            destination,
            config,
            response: Response::new(),
            request: None,
            connect_pending: false,
            callbacks: Callbacks::default(),
        }
    }

    pub fn on_response<F: FnMut(&Response) + 'static>(&mut self, handler: F) {
        self.callbacks.set_response(Box::new(handler));
    }

    pub fn on_data<F: FnMut(&[u8]) + 'static>(&mut self, handler: F) {
        self.callbacks.set_data(Box::new(handler));
    }

    pub fn on_error<F: FnMut(&HttpError) + 'static>(&mut self, handler: F) {
        self.callbacks.set_error(Box::new(handler));
    }

    pub fn on_complete<F: FnMut(&Completion) + 'static>(&mut self, handler: F) {
        self.callbacks.set_complete(Box::new(handler));
    }

    pub fn get(&mut self, path: impl Into<String>) -> Result<(), HttpError> {
        let request = Request::get(self.destination.clone(), path);
        self.start(request)
    }

    pub fn post(
        &mut self,
        path: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Result<(), HttpError> {
        let request = Request::post(self.destination.clone(), path, content_type, body);
        self.start(request)
    }

    pub fn state(&self) -> ParseState {
        self.parser.state()
    }

    /// Connect pending, or a response is being read.
    pub fn is_in_flight(&self) -> bool {
        self.connect_pending || self.parser.state().is_active()
    }

    /// Response head accumulated so far for the current attempt.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn body_bytes(&self) -> u64 {
        self.parser.body_bytes()
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn start(&mut self, request: Request) -> Result<(), HttpError> {
        if self.is_in_flight() {
            warn!(path = request.path(), "rejecting request: another is in flight");
            return Err(HttpError::RequestInFlight);
        }
        self.request = Some(request);
        self.response = Response::new();
        self.parser.reset();
        if self.transport.is_connected() {
            self.send_request();
        } else {
            debug!(destination = %self.destination, "connecting");
            self.connect_pending = true;
            self.transport.connect(&self.destination);
        }
        Ok(())
    }

    fn send_request(&mut self) {
        let Some(request) = self.request.as_ref() else {
            return;
        };
        let wire = request.to_bytes();
        debug!(
            method = request.method().as_str(),
            path = request.path(),
            bytes = wire.len(),
            "sending request"
        );
        self.parser.begin();
        self.response = Response::new();
        if let Err(e) = self.transport.send(wire) {
            self.fail(
                TerminationReason::TransportError,
                HttpError::ConnectionFailed(e.to_string()),
            );
        }
    }

    /// Transport connected. A connect that lands after its attempt was
    /// abandoned (timed out or failed while connecting) is closed again.
    pub fn handle_connect(&mut self) {
        if !self.connect_pending {
            if self.request.is_some() {
                debug!(state = ?self.parser.state(), "closing connection for abandoned attempt");
                self.transport.close();
            } else {
                debug!("connected with no pending request");
            }
            return;
        }
        self.connect_pending = false;
        self.send_request();
    }

    /// Bytes received from the transport.
    pub fn handle_data(&mut self, data: &[u8]) {
        if !self.parser.state().is_active() {
            trace!(bytes = data.len(), state = ?self.parser.state(), "ignoring data");
            return;
        }
        let mut driver = H1Driver {
            response: &mut self.response,
            callbacks: &mut self.callbacks,
            retain_headers: self.config.retain_headers,
        };
        if let Err(e) = self.parser.receive(data, &mut driver) {
            debug!(error = %e, "invalid response");
            self.transport.close();
            self.callbacks.error(&HttpError::InvalidResponse(e));
        }
    }

    /// Transport disconnected. Ends the attempt with `Closed`; this is the
    /// normal end of a body and is never reported as an error. Callers
    /// waiting on a head can tell a premature close from `state()`.
    pub fn handle_disconnect(&mut self) {
        let state = self.parser.state();
        if !self.is_in_flight() {
            trace!(?state, "disconnect with nothing in flight");
            return;
        }
        self.connect_pending = false;
        self.parser.terminate(TerminationReason::Closed);
        if state != ParseState::StreamingBody {
            debug!(?state, "connection closed before response body");
            return;
        }
        let completion = Completion {
            body_bytes: self.parser.body_bytes(),
            content_length: self.response.content_length,
        };
        debug!(
            body_bytes = completion.body_bytes,
            content_length = ?completion.content_length,
            "response complete"
        );
        self.callbacks.complete(&completion);
    }

    /// Transport gave up waiting for activity.
    pub fn handle_timeout(&mut self, elapsed: Duration) {
        if !self.is_in_flight() {
            trace!(?elapsed, "timeout with nothing in flight");
            return;
        }
        self.fail(TerminationReason::TimedOut, HttpError::TimedOut(elapsed));
    }

    /// Transport-level failure (connect refused, reset, ...). `code` is the transport's own.
    pub fn handle_error(&mut self, code: i32) {
        if !self.is_in_flight() {
            trace!(code, "transport error with nothing in flight");
            return;
        }
        self.fail(
            TerminationReason::TransportError,
            HttpError::ConnectionFailed(format!("transport error {}", code)),
        );
    }

    fn fail(&mut self, reason: TerminationReason, error: HttpError) {
        debug!(?reason, error = %error, "request terminated");
        self.connect_pending = false;
        self.parser.terminate(reason);
        self.callbacks.error(&error);
    }
}
