/*
 * request.rs
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

//! HTTP request: method, path, destination, optional typed body.
//!
//! Immutable once issued; the client serializes it when the connection is up.

use bytes::{Bytes, BytesMut};

use crate::transport::Destination;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Payload of a POST: content type plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub content_type: String,
    pub data: Bytes,
}

/// One outgoing request. GET never carries a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    destination: Destination,
    method: Method,
    path: String,
    body: Option<Body>,
}

impl Request {
    pub fn get(destination: Destination, path: impl Into<String>) -> Self {
        Self {
            destination,
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(
        destination: Destination,
        path: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            destination,
            method: Method::Post,
            path: path.into(),
            body: Some(Body {
                content_type: content_type.into(),
                data: data.into(),
            }),
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Serialize request line, headers and body into one buffer.
    pub fn to_bytes(&self) -> Bytes {
        let body_len = self.body.as_ref().map(|b| b.data.len()).unwrap_or(0);
        let mut out = BytesMut::with_capacity(128 + self.path.len() + body_len);
        self.write_to(&mut out);
        out.freeze()
    }

    pub fn write_to(&self, out: &mut BytesMut) {
        out.extend_from_slice(self.method.as_str().as_bytes());
        out.extend_from_slice(b" ");
        out.extend_from_slice(self.path.as_bytes());
        out.extend_from_slice(b" HTTP/1.1\r\n");
        out.extend_from_slice(b"Host: ");
        out.extend_from_slice(self.destination.authority().as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(body) = &self.body {
            out.extend_from_slice(b"Content-Type: ");
            out.extend_from_slice(body.content_type.as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(b"Content-Length: ");
            out.extend_from_slice(body.data.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        if let Some(body) = &self.body {
            out.extend_from_slice(&body.data);
        }
    }
}
