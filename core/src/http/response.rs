/*
 * response.rs
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

//! Response head as accumulated by the parser, and the completion summary.

/// Status, content type, declared length and (optionally) all headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// 0 until the status line has been parsed.
    pub status_code: u16,
    pub reason: String,
    pub content_type: Option<String>,
    /// Value of a well-formed Content-Length header.
    pub content_length: Option<u64>,
    /// Number of header lines seen, recognized or not.
    pub header_count: usize,
    /// Every header in arrival order; only filled when retention is enabled.
    pub headers: Vec<(String, String)>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// First retained header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_status(&mut self, code: u16, reason: &str) {
        self.status_code = code;
        self.reason = reason.to_string();
    }

    /// Interpret one header. Malformed Content-Length is ignored.
    pub(crate) fn apply_header(&mut self, name: &str, value: &str, retain: bool) {
        self.header_count += 1;
        if name.eq_ignore_ascii_case("content-length") {
            match value.trim().parse::<u64>() {
                Ok(n) => self.content_length = Some(n),
                Err(_) => tracing::warn!(value, "ignoring malformed Content-Length"),
            }
        } else if name.eq_ignore_ascii_case("content-type") {
            self.content_type = Some(value.to_string());
        }
        if retain {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }
}

/// Summary delivered when the connection closes after the body started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub body_bytes: u64,
    pub content_length: Option<u64>,
}

impl Completion {
    /// False when a declared length was not reached before the close.
    pub fn is_complete(&self) -> bool {
        self.content_length
            .map(|cl| self.body_bytes >= cl)
            .unwrap_or(true)
    }
}
