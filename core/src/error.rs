/*
 * error.rs
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

//! Client and parser errors.

use std::time::Duration;

/// Error code reported for a transport connect/send failure.
pub const ERROR_CONNECTION_FAILED: i32 = -1;
/// Error code reported when the transport timed out.
pub const ERROR_TIMED_OUT: i32 = -2;
/// Error code reported for a malformed status line or an overlong line.
pub const ERROR_INVALID_RESPONSE: i32 = -3;
/// Error code returned when get/post is called while a request is in flight.
pub const ERROR_REQUEST_IN_FLIGHT: i32 = -4;

/// Errors produced while parsing a response head.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Status line does not start with the `HTTP/` protocol token and a space.
    #[error("status line has no HTTP protocol token")]
    MissingProtocol,

    /// No decimal digits where the status code is expected.
    #[error("status line has no status code")]
    MissingStatusCode,

    /// Status code digits do not fit in 16 bits.
    #[error("status code out of range")]
    StatusCodeOutOfRange,

    /// Peer sent more than `limit` bytes without a line terminator.
    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Errors reported to the caller, either through the error handler or as a
/// direct return from get/post.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connect or send failed, or the transport reported an error.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No activity within the transport's timeout window.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The response head could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] ParseError),

    /// A request is already in flight on this client.
    #[error("a request is already in flight")]
    RequestInFlight,
}

impl HttpError {
    /// Stable integer code, as exposed over the C ABI.
    pub fn code(&self) -> i32 {
        match self {
            HttpError::ConnectionFailed(_) => ERROR_CONNECTION_FAILED,
            HttpError::TimedOut(_) => ERROR_TIMED_OUT,
            HttpError::InvalidResponse(_) => ERROR_INVALID_RESPONSE,
            HttpError::RequestInFlight => ERROR_REQUEST_IN_FLIGHT,
        }
    }
}
