/*
 * line.rs
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

//! Line reassembly across delivery events.

use std::ops::Deref;

use bytes::BytesMut;

use crate::error::ParseError;

/// Bytes of an unterminated line carried between delivery events. Never holds `\n`.
///
/// `limit` bounds the line content; the `\r\n` terminator does not count.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    limit: usize,
}

/// A complete line with the terminator (and any trailing `\r`) removed.
///
/// Borrowed when the whole line arrived in one delivery event, owned when it
/// was stitched together from buffered fragments.
#[derive(Debug)]
pub enum Line<'a> {
    Borrowed(&'a [u8]),
    Owned(BytesMut),
}

impl Deref for Line<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Line::Borrowed(s) => s,
            Line::Owned(b) => b,
        }
    }
}

impl LineBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Keep a fragment that ended without `\n`.
    pub fn append(&mut self, fragment: &[u8]) -> Result<(), ParseError> {
        self.check(fragment)?;
        self.buf.extend_from_slice(fragment);
        Ok(())
    }

    /// `tail` is everything up to (not including) the `\n` that ends the line.
    /// Returns buffered bytes plus `tail`, and leaves the buffer empty.
    pub fn complete<'a>(&mut self, tail: &'a [u8]) -> Result<Line<'a>, ParseError> {
        if let Err(e) = self.check(tail) {
            self.buf.clear();
            return Err(e);
        }
        if self.buf.is_empty() {
            return Ok(Line::Borrowed(tail.strip_suffix(b"\r").unwrap_or(tail)));
        }
        self.buf.extend_from_slice(tail);
        let mut line = self.buf.split();
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Ok(Line::Owned(line))
    }

    /// A trailing `\r` may still turn out to be the terminator, so it is not counted.
    fn check(&self, extra: &[u8]) -> Result<(), ParseError> {
        let mut len = self.buf.len() + extra.len();
        if extra.last().or(self.buf.last()) == Some(&b'\r') {
            len -= 1;
        }
        if len > self.limit {
            return Err(ParseError::LineTooLong { limit: self.limit });
        }
        Ok(())
    }
}
