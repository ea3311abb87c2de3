/*
 * config.rs
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

//! Client configuration: parser limits and driver timeouts.
//!
//! Built from defaults, deserialized with serde (all fields optional), or
//! overlaid from `ASYNCHTTP_*` environment variables.

use std::time::Duration;

use serde::Deserialize;

/// Longest status or header line accepted, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Per-client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cap on one status/header line; exceeding it fails the response as invalid.
    pub max_line_length: usize,
    /// Connect timeout applied by the TCP driver.
    pub connect_timeout_ms: u64,
    /// Inactivity timeout applied by the TCP driver while waiting for data.
    pub read_timeout_ms: u64,
    /// Keep every response header (in order) on the Response.
    pub retain_headers: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            retain_headers: false,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with any well-formed `ASYNCHTTP_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "ASYNCHTTP_MAX_LINE_LENGTH") {
            config.max_line_length = v;
        }
        if let Some(v) = parse_var(&lookup, "ASYNCHTTP_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "ASYNCHTTP_READ_TIMEOUT_MS") {
            config.read_timeout_ms = v;
        }
        if let Some(v) = lookup("ASYNCHTTP_RETAIN_HEADERS") {
            match v.trim() {
                "1" | "true" | "yes" => config.retain_headers = true,
                "0" | "false" | "no" => config.retain_headers = false,
                _ => {}
            }
        }
        config
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.max_line_length, 8192);
        assert_eq!(c.connect_timeout(), Duration::from_secs(15));
        assert_eq!(c.read_timeout(), Duration::from_secs(30));
        assert!(!c.retain_headers);
    }

    #[test]
    fn deserialize_partial_json() {
        let c: ClientConfig =
            serde_json::from_str(r#"{"max_line_length": 512, "retain_headers": true}"#).unwrap();
        assert_eq!(c.max_line_length, 512);
        assert!(c.retain_headers);
        assert_eq!(c.connect_timeout_ms, 15_000);
    }

    #[test]
    fn lookup_overlays_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("ASYNCHTTP_MAX_LINE_LENGTH", "1024"),
            ("ASYNCHTTP_READ_TIMEOUT_MS", "soon"),
            ("ASYNCHTTP_RETAIN_HEADERS", "yes"),
        ]
        .into_iter()
        .collect();
        let c = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.max_line_length, 1024);
        assert_eq!(c.read_timeout_ms, 30_000);
        assert!(c.retain_headers);
    }
}
