/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, headers, then read-until-close body.

use crate::error::ParseError;
use crate::http::h1::line::LineBuffer;

/// Callback for HTTP/1.1 response events. The client implements this and forwards to user handlers.
pub trait H1ResponseHandler {
    fn status(&mut self, code: u16, reason: &str);
    fn header(&mut self, name: &str, value: &str);
    /// Blank line seen; fires once per response, before any body chunk.
    fn headers_complete(&mut self);
    fn body_chunk(&mut self, data: &[u8]);
}

/// Why an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Transport disconnected.
    Closed,
    TimedOut,
    TransportError,
    InvalidResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    AwaitingStatusLine,
    AwaitingHeaders,
    StreamingBody,
    Terminated(TerminationReason),
}

impl ParseState {
    /// A response is being read for an issued request.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ParseState::AwaitingStatusLine | ParseState::AwaitingHeaders | ParseState::StreamingBody
        )
    }
}

/// Push parser for one HTTP/1.1 response. Feed each delivery event via `receive`;
/// the handler is invoked as lines complete and as body bytes arrive.
pub struct ResponseParser {
    state: ParseState,
    line: LineBuffer,
    header_lines: usize,
    body_bytes: u64,
}

impl ResponseParser {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            state: ParseState::Idle,
            line: LineBuffer::new(max_line_length),
            header_lines: 0,
            body_bytes: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Body bytes handed to the handler since the last `begin`.
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Non-empty header lines seen, well-formed or not.
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    /// Bytes of a partial line waiting for its terminator.
    pub fn pending_line_len(&self) -> usize {
        self.line.len()
    }

    /// Start reading a new response.
    pub fn begin(&mut self) {
        self.clear();
        self.state = ParseState::AwaitingStatusLine;
    }

    pub fn terminate(&mut self, reason: TerminationReason) {
        self.line.clear();
        self.state = ParseState::Terminated(reason);
    }

    pub fn reset(&mut self) {
        self.clear();
        self.state = ParseState::Idle;
    }

    fn clear(&mut self) {
        self.line.clear();
        self.header_lines = 0;
        self.body_bytes = 0;
    }

    /// Consume one delivery event. A partial line is kept for the next call.
    /// On error the parser is terminated with `InvalidResponse`.
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        data: &[u8],
        handler: &mut H,
    ) -> Result<(), ParseError> {
        let result = self.consume(data, handler);
        if result.is_err() {
            self.terminate(TerminationReason::InvalidResponse);
        }
        result
    }

    fn consume<H: H1ResponseHandler>(&mut self, data: &[u8], handler: &mut H) -> Result<(), ParseError> {
        let mut pos = 0;
        while pos < data.len() {
            match self.state {
                ParseState::AwaitingStatusLine | ParseState::AwaitingHeaders => {
                    let rest = &data[pos..];
                    let lf = match rest.iter().position(|&b| b == b'\n') {
                        Some(n) => n,
                        None => return self.line.append(rest),
                    };
                    pos += lf + 1;
                    let line = self.line.complete(&rest[..lf])?;
                    if self.state == ParseState::AwaitingStatusLine {
                        let (code, reason) = parse_status_line(&line)?;
                        handler.status(code, &reason);
                        self.state = ParseState::AwaitingHeaders;
                    } else if line.is_empty() {
                        self.state = ParseState::StreamingBody;
                        handler.headers_complete();
                    } else {
                        self.header_lines += 1;
                        match split_header(&line) {
                            Some((name, value)) => handler.header(name, value),
                            None => tracing::warn!(
                                line = %String::from_utf8_lossy(&line),
                                "skipping malformed header"
                            ),
                        }
                    }
                }
                ParseState::StreamingBody => {
                    let chunk = &data[pos..];
                    self.body_bytes += chunk.len() as u64;
                    handler.body_chunk(chunk);
                    return Ok(());
                }
                ParseState::Idle | ParseState::Terminated(_) => {
                    tracing::trace!(bytes = data.len() - pos, state = ?self.state, "ignoring data");
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

/// `HTTP/<version> <code>[ <reason>]`
fn parse_status_line(line: &[u8]) -> Result<(u16, String), ParseError> {
    if !line.starts_with(b"HTTP/") {
        return Err(ParseError::MissingProtocol);
    }
    let space = line
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ParseError::MissingProtocol)?;
    let rest = &line[space + 1..];
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(ParseError::MissingStatusCode);
    }
    let code = rest[..digits]
        .iter()
        .try_fold(0u16, |acc, &b| {
            acc.checked_mul(10)?.checked_add(u16::from(b - b'0'))
        })
        .ok_or(ParseError::StatusCodeOutOfRange)?;
    let after = &rest[digits..];
    let reason = after.strip_prefix(b" ").unwrap_or(after);
    Ok((code, String::from_utf8_lossy(reason).into_owned()))
}

/// Split on the first `": "`. None if absent or not UTF-8.
fn split_header(line: &[u8]) -> Option<(&str, &str)> {
    let at = line.windows(2).position(|w| w == b": ")?;
    let name = std::str::from_utf8(&line[..at]).ok()?;
    let value = std::str::from_utf8(&line[at + 2..]).ok()?;
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        status: Option<(u16, String)>,
        headers: Vec<(String, String)>,
        complete_calls: usize,
        headers_at_complete: usize,
        body: Vec<u8>,
        chunks: usize,
    }

    impl H1ResponseHandler for Recorder {
        fn status(&mut self, code: u16, reason: &str) {
            assert!(self.status.is_none(), "status reported twice");
            self.status = Some((code, reason.to_string()));
        }
        fn header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_string(), value.to_string()));
        }
        fn headers_complete(&mut self) {
            self.complete_calls += 1;
            self.headers_at_complete = self.headers.len();
        }
        fn body_chunk(&mut self, data: &[u8]) {
            self.chunks += 1;
            self.body.extend_from_slice(data);
        }
    }

    fn feed(chunks: &[&[u8]]) -> (ResponseParser, Recorder, Result<(), ParseError>) {
        let mut p = ResponseParser::new(1024);
        p.begin();
        let mut r = Recorder::default();
        for c in chunks {
            if let Err(e) = p.receive(c, &mut r) {
                return (p, r, Err(e));
            }
        }
        (p, r, Ok(()))
    }

    #[test]
    fn status_line_404() {
        assert_eq!(
            parse_status_line(b"HTTP/1.1 404 Not Found").unwrap(),
            (404, "Not Found".to_string())
        );
    }

    #[test]
    fn status_line_without_reason() {
        assert_eq!(parse_status_line(b"HTTP/1.0 204").unwrap(), (204, String::new()));
    }

    #[test]
    fn status_line_errors() {
        assert_eq!(parse_status_line(b"GARBAGE"), Err(ParseError::MissingProtocol));
        assert_eq!(parse_status_line(b"HTTP/1.1"), Err(ParseError::MissingProtocol));
        assert_eq!(parse_status_line(b"HTTP/1.1 OK"), Err(ParseError::MissingStatusCode));
        assert_eq!(
            parse_status_line(b"HTTP/1.1 99999 Big"),
            Err(ParseError::StatusCodeOutOfRange)
        );
    }

    #[test]
    fn header_split_on_first_colon_space() {
        assert_eq!(split_header(b"Location: http://x/y: z"), Some(("Location", "http://x/y: z")));
        assert_eq!(split_header(b"NoSeparator"), None);
        assert_eq!(split_header(b"Tight:value"), None);
    }

    #[test]
    fn every_split_of_a_status_line_parses_identically() {
        let line = b"HTTP/1.1 404 Not Found\r\n";
        for split in 1..line.len() {
            let (p, r, res) = feed(&[&line[..split], &line[split..]]);
            res.unwrap();
            assert_eq!(r.status, Some((404, "Not Found".to_string())), "split at {}", split);
            assert_eq!(p.state(), ParseState::AwaitingHeaders);
            assert_eq!(p.pending_line_len(), 0);
        }
    }

    #[test]
    fn every_chunk_size_of_a_header_line_parses_identically() {
        let input = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n";
        for size in 1..=input.len() {
            let chunks: Vec<&[u8]> = input.chunks(size).collect();
            let (_, r, res) = feed(&chunks);
            res.unwrap();
            assert_eq!(
                r.headers,
                vec![("Content-Type".to_string(), "application/json".to_string())],
                "chunk size {}",
                size
            );
        }
    }

    #[test]
    fn headers_complete_fires_once_after_all_headers() {
        let input = b"HTTP/1.1 200 OK\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\nbody";
        for size in 1..=input.len() {
            let chunks: Vec<&[u8]> = input.chunks(size).collect();
            let (p, r, res) = feed(&chunks);
            res.unwrap();
            assert_eq!(r.complete_calls, 1);
            assert_eq!(r.headers_at_complete, 3);
            assert_eq!(p.header_lines(), 3);
        }
    }

    #[test]
    fn body_bytes_are_conserved_across_chunkings() {
        let head = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
        let body: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut input = head;
        input.extend_from_slice(&body);
        for size in [1, 2, 7, 19, 64, 999, 5000] {
            let chunks: Vec<&[u8]> = input.chunks(size).collect();
            let (p, r, res) = feed(&chunks);
            res.unwrap();
            assert_eq!(r.body, body);
            assert_eq!(p.body_bytes(), body.len() as u64);
            assert_eq!(p.state(), ParseState::StreamingBody);
        }
    }

    #[test]
    fn body_in_same_chunk_as_blank_line_is_first_chunk() {
        let (_, r, res) = feed(&[b"HTTP/1.1 200 OK\r\n\r\nhello"]);
        res.unwrap();
        assert_eq!(r.chunks, 1);
        assert_eq!(r.body, b"hello");
    }

    #[test]
    fn no_empty_body_chunk_when_chunk_ends_at_blank_line() {
        let (_, r, res) = feed(&[b"HTTP/1.1 200 OK\r\n\r\n"]);
        res.unwrap();
        assert_eq!(r.complete_calls, 1);
        assert_eq!(r.chunks, 0);
    }

    #[test]
    fn body_bytes_are_not_line_framed() {
        let (_, r, res) = feed(&[b"HTTP/1.1 200 OK\r\n\r\n", b"a\r\n\r\nb\n"]);
        res.unwrap();
        assert_eq!(r.body, b"a\r\n\r\nb\n");
    }

    #[test]
    fn bare_lf_terminators_are_accepted() {
        let (_, r, res) = feed(&[b"HTTP/1.1 200 OK\nX: y\n\nz"]);
        res.unwrap();
        assert_eq!(r.status.as_ref().map(|s| s.0), Some(200));
        assert_eq!(r.headers.len(), 1);
        assert_eq!(r.body, b"z");
    }

    #[test]
    fn garbage_status_line_terminates() {
        let (p, r, res) = feed(&[b"GARBAGE\r\n"]);
        assert_eq!(res, Err(ParseError::MissingProtocol));
        assert_eq!(p.state(), ParseState::Terminated(TerminationReason::InvalidResponse));
        assert!(r.status.is_none());
        assert_eq!(r.complete_calls, 0);
    }

    #[test]
    fn malformed_header_is_skipped() {
        let (p, r, res) = feed(&[b"HTTP/1.1 200 OK\r\nbroken\r\nX: 1\r\n\r\n"]);
        res.unwrap();
        assert_eq!(r.headers, vec![("X".to_string(), "1".to_string())]);
        assert_eq!(p.header_lines(), 2);
        assert_eq!(r.complete_calls, 1);
    }

    #[test]
    fn unterminated_line_over_limit_is_invalid() {
        let mut p = ResponseParser::new(16);
        p.begin();
        let mut r = Recorder::default();
        p.receive(b"HTTP/1.1 200 OK\r\nX-Long: ", &mut r).unwrap();
        let err = p.receive(b"aaaaaaaaaaaaaaaa", &mut r).unwrap_err();
        assert_eq!(err, ParseError::LineTooLong { limit: 16 });
        assert_eq!(p.state(), ParseState::Terminated(TerminationReason::InvalidResponse));
        assert_eq!(p.pending_line_len(), 0);
    }

    #[test]
    fn data_while_idle_or_terminated_is_ignored() {
        let mut p = ResponseParser::new(64);
        let mut r = Recorder::default();
        p.receive(b"HTTP/1.1 200 OK\r\n", &mut r).unwrap();
        assert!(r.status.is_none());
        p.begin();
        p.terminate(TerminationReason::Closed);
        p.receive(b"HTTP/1.1 200 OK\r\n", &mut r).unwrap();
        assert!(r.status.is_none());
    }

    #[test]
    fn begin_clears_partial_line_and_counters() {
        let mut p = ResponseParser::new(64);
        let mut r = Recorder::default();
        p.begin();
        p.receive(b"HTTP/1.1 200 OK\r\n\r\nabc", &mut r).unwrap();
        p.begin();
        assert_eq!(p.body_bytes(), 0);
        p.receive(b"HTTP/1.1 2", &mut r).unwrap();
        assert_eq!(p.pending_line_len(), 10);
        p.begin();
        assert_eq!(p.pending_line_len(), 0);
        assert_eq!(p.state(), ParseState::AwaitingStatusLine);
    }
}
