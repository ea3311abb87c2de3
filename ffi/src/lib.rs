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

//! C FFI for the asynchttp core. A client is an opaque handle created with
//! asynchttp_client_new and released with asynchttp_client_free.
//! All string parameters are UTF-8 NUL-terminated.
//!
//! Two ways to do the I/O:
//! - Host-driven: the host owns the socket. It pops commands with
//!   asynchttp_next_command and reports socket events with asynchttp_transport_*.
//! - Library-driven: asynchttp_client_run performs the request over TCP on an
//!   internal tokio runtime and returns when the attempt terminates.
//!
//! Callbacks run on the thread that made the call which triggered them.
//!
//! Callbacks must not call back into the client they were fired from. Such
//! calls are refused: get/post return ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT, the
//! other functions returning int give ASYNCHTTP_ERROR_INVALID_ARGUMENT, and
//! the rest (callback registration, free, transport events) do nothing.
//! Issue a follow-up request after the transport call has returned.

use libc::{c_char, c_int, c_void, size_t};
use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::net::IpAddr;
use std::ptr;
use std::time::Duration;

use asynchttp_core::net::TcpDriver;
use asynchttp_core::{
    AsyncHttpClient, ClientConfig, Destination, Host, HttpError, ParseState, QueuedTransport,
    TerminationReason, TransportCommand,
};

/// Returned by get/post when a request is already in flight.
pub const ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT: c_int = -4;
/// Returned when a pointer argument is NULL or a string is not valid UTF-8.
pub const ASYNCHTTP_ERROR_INVALID_ARGUMENT: c_int = -5;

pub const ASYNCHTTP_COMMAND_NONE: c_int = 0;
pub const ASYNCHTTP_COMMAND_CONNECT: c_int = 1;
pub const ASYNCHTTP_COMMAND_SEND: c_int = 2;
pub const ASYNCHTTP_COMMAND_CLOSE: c_int = 3;

pub const ASYNCHTTP_STATE_IDLE: c_int = 0;
pub const ASYNCHTTP_STATE_AWAITING_STATUS_LINE: c_int = 1;
pub const ASYNCHTTP_STATE_AWAITING_HEADERS: c_int = 2;
pub const ASYNCHTTP_STATE_STREAMING_BODY: c_int = 3;
pub const ASYNCHTTP_STATE_CLOSED: c_int = 4;
pub const ASYNCHTTP_STATE_TIMED_OUT: c_int = 5;
pub const ASYNCHTTP_STATE_TRANSPORT_ERROR: c_int = 6;
pub const ASYNCHTTP_STATE_INVALID_RESPONSE: c_int = 7;

/// Response headers complete: status, reason, content type (NULL if none),
/// declared content length (-1 if none), user_data. Strings are valid for the call only.
type OnResponse = extern "C" fn(c_int, *const c_char, *const c_char, i64, *mut c_void);
/// Body chunk: data, length, user_data. Data is valid for the call only.
type OnData = extern "C" fn(*const u8, size_t, *mut c_void);
/// Error: code (-1 connection failed, -2 timed out, -3 invalid response), message, user_data.
type OnError = extern "C" fn(c_int, *const c_char, *mut c_void);
/// Connection closed after the body started: body bytes, declared length (-1 if none), user_data.
type OnComplete = extern "C" fn(u64, i64, *mut c_void);

/// Command for the host to carry out. For CONNECT, host/port are set; for SEND,
/// data/len are set. Pointers stay valid until the next call on the same client.
#[repr(C)]
pub struct AsyncHttpCommand {
    pub kind: c_int,
    pub host: *const c_char,
    pub port: u16,
    pub data: *const u8,
    pub len: size_t,
}

/// Opaque client handle.
pub struct AsyncHttpClientHandle {
    client: AsyncHttpClient<QueuedTransport>,
    /// Keeps the last command's buffers alive for the host.
    current: Option<TransportCommand>,
    current_host: Option<CString>,
    /// Set while a transport event (and so a user callback) is running.
    dispatching: Cell<bool>,
}

fn runtime() -> Option<&'static tokio::runtime::Runtime> {
    static RUNTIME: once_cell::sync::OnceCell<tokio::runtime::Runtime> =
        once_cell::sync::OnceCell::new();
    RUNTIME
        .get_or_try_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
        })
        .map_err(|e| tracing::error!(error = %e, "failed to create tokio runtime"))
        .ok()
}

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn cstring(s: &str) -> CString {
    CString::new(s).unwrap_or_default()
}

fn state_code(state: ParseState) -> c_int {
    match state {
        ParseState::Idle => ASYNCHTTP_STATE_IDLE,
        ParseState::AwaitingStatusLine => ASYNCHTTP_STATE_AWAITING_STATUS_LINE,
        ParseState::AwaitingHeaders => ASYNCHTTP_STATE_AWAITING_HEADERS,
        ParseState::StreamingBody => ASYNCHTTP_STATE_STREAMING_BODY,
        ParseState::Terminated(TerminationReason::Closed) => ASYNCHTTP_STATE_CLOSED,
        ParseState::Terminated(TerminationReason::TimedOut) => ASYNCHTTP_STATE_TIMED_OUT,
        ParseState::Terminated(TerminationReason::TransportError) => ASYNCHTTP_STATE_TRANSPORT_ERROR,
        ParseState::Terminated(TerminationReason::InvalidResponse) => ASYNCHTTP_STATE_INVALID_RESPONSE,
    }
}

fn result_code(result: Result<(), HttpError>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

fn new_handle(host: Host, port: u16) -> *mut AsyncHttpClientHandle {
    let client = AsyncHttpClient::with_config(
        QueuedTransport::new(),
        Destination::new(host, port),
        ClientConfig::from_env(),
    );
    Box::into_raw(Box::new(AsyncHttpClientHandle {
        client,
        current: None,
        current_host: None,
        dispatching: Cell::new(false),
    }))
}

/// True while a callback on this client is running. Touches only the flag,
/// so it is sound to call while the client is mutably borrowed by `dispatch`.
unsafe fn is_dispatching(client: *const AsyncHttpClientHandle) -> bool {
    !client.is_null() && (*ptr::addr_of!((*client).dispatching)).get()
}

/// Run a transport event on the client with re-entry locked out. Only the
/// `client` field is borrowed, leaving `dispatching` readable from callbacks.
unsafe fn dispatch<R>(
    client: *mut AsyncHttpClientHandle,
    event: impl FnOnce(&mut AsyncHttpClient<QueuedTransport>) -> R,
) -> Option<R> {
    if client.is_null() {
        return None;
    }
    if is_dispatching(client) {
        tracing::warn!("ignoring transport event raised from inside a callback");
        return None;
    }
    let flag = &*ptr::addr_of!((*client).dispatching);
    flag.set(true);
    let result = event(&mut *ptr::addr_of_mut!((*client).client));
    flag.set(false);
    Some(result)
}

/// The handle for a call that must not run inside a callback.
unsafe fn idle_handle<'a>(client: *mut AsyncHttpClientHandle) -> Option<&'a mut AsyncHttpClientHandle> {
    if is_dispatching(client) {
        tracing::warn!("refusing call made from inside a callback");
        return None;
    }
    client.as_mut()
}

/// Install a fmt tracing subscriber at INFO. Safe to call more than once; a
/// subscriber installed by the host first is left in place.
#[no_mangle]
pub extern "C" fn asynchttp_init_logging() {
    static INIT: once_cell::sync::OnceCell<()> = once_cell::sync::OnceCell::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .with_level(true)
            .try_init();
    });
}

/// Create a client for a host name. Configuration comes from ASYNCHTTP_* environment variables.
/// Returns NULL if host is NULL or not UTF-8. Free with asynchttp_client_free.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_new(host: *const c_char, port: u16) -> *mut AsyncHttpClientHandle {
    match str_arg(host) {
        Some(h) if !h.is_empty() => new_handle(Host::Name(h.to_string()), port),
        _ => ptr::null_mut(),
    }
}

/// Create a client for a literal IPv4/IPv6 address. Returns NULL if the address does not parse.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_new_address(
    address: *const c_char,
    port: u16,
) -> *mut AsyncHttpClientHandle {
    match str_arg(address).and_then(|a| a.parse::<IpAddr>().ok()) {
        Some(ip) => new_handle(Host::Address(ip), port),
        None => ptr::null_mut(),
    }
}

/// Free a client. No-op if client is NULL or a callback on it is running.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_free(client: *mut AsyncHttpClientHandle) {
    if idle_handle(client).is_some() {
        drop(Box::from_raw(client));
    }
}

/// Register the response callback; NULL clears it.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_on_response(
    client: *mut AsyncHttpClientHandle,
    callback: Option<OnResponse>,
    user_data: *mut c_void,
) {
    let Some(handle) = idle_handle(client) else {
        return;
    };
    handle.client.on_response(move |response| {
        if let Some(cb) = callback {
            let reason = cstring(&response.reason);
            let content_type = response.content_type.as_deref().map(cstring);
            let content_length = response
                .content_length
                .and_then(|n| i64::try_from(n).ok())
                .unwrap_or(-1);
            cb(
                c_int::from(response.status_code),
                reason.as_ptr(),
                content_type.as_ref().map(|c| c.as_ptr()).unwrap_or(ptr::null()),
                content_length,
                user_data,
            );
        }
    });
}

/// Register the body chunk callback; NULL clears it.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_on_data(
    client: *mut AsyncHttpClientHandle,
    callback: Option<OnData>,
    user_data: *mut c_void,
) {
    let Some(handle) = idle_handle(client) else {
        return;
    };
    handle.client.on_data(move |data| {
        if let Some(cb) = callback {
            cb(data.as_ptr(), data.len(), user_data);
        }
    });
}

/// Register the error callback; NULL clears it.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_on_error(
    client: *mut AsyncHttpClientHandle,
    callback: Option<OnError>,
    user_data: *mut c_void,
) {
    let Some(handle) = idle_handle(client) else {
        return;
    };
    handle.client.on_error(move |error| {
        if let Some(cb) = callback {
            let message = cstring(&error.to_string());
            cb(error.code(), message.as_ptr(), user_data);
        }
    });
}

/// Register the completion callback; NULL clears it.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_on_complete(
    client: *mut AsyncHttpClientHandle,
    callback: Option<OnComplete>,
    user_data: *mut c_void,
) {
    let Some(handle) = idle_handle(client) else {
        return;
    };
    handle.client.on_complete(move |completion| {
        if let Some(cb) = callback {
            let content_length = completion
                .content_length
                .and_then(|n| i64::try_from(n).ok())
                .unwrap_or(-1);
            cb(completion.body_bytes, content_length, user_data);
        }
    });
}

/// Issue a GET. Returns 0, ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT or ASYNCHTTP_ERROR_INVALID_ARGUMENT.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_get(client: *mut AsyncHttpClientHandle, path: *const c_char) -> c_int {
    if is_dispatching(client) {
        return ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT;
    }
    let (Some(handle), Some(path)) = (client.as_mut(), str_arg(path)) else {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    };
    result_code(handle.client.get(path))
}

/// Issue a POST. The body (len bytes at data; data may be NULL when len is 0) is copied.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_post(
    client: *mut AsyncHttpClientHandle,
    path: *const c_char,
    content_type: *const c_char,
    data: *const u8,
    len: size_t,
) -> c_int {
    if is_dispatching(client) {
        return ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT;
    }
    let (Some(handle), Some(path), Some(content_type)) =
        (client.as_mut(), str_arg(path), str_arg(content_type))
    else {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    };
    let body = if len == 0 {
        Vec::new()
    } else if data.is_null() {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    } else {
        std::slice::from_raw_parts(data, len).to_vec()
    };
    result_code(handle.client.post(path, content_type, body))
}

/// Current parse state (ASYNCHTTP_STATE_*), or ASYNCHTTP_ERROR_INVALID_ARGUMENT.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_state(client: *const AsyncHttpClientHandle) -> c_int {
    if is_dispatching(client) {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    }
    match client.as_ref() {
        Some(handle) => state_code(handle.client.state()),
        None => ASYNCHTTP_ERROR_INVALID_ARGUMENT,
    }
}

/// Body bytes delivered so far for the current attempt (0 from inside a callback).
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_body_bytes(client: *const AsyncHttpClientHandle) -> u64 {
    if is_dispatching(client) {
        return 0;
    }
    client.as_ref().map(|h| h.client.body_bytes()).unwrap_or(0)
}

/// Pop the next transport command into out. Returns its kind (ASYNCHTTP_COMMAND_NONE when empty).
#[no_mangle]
pub unsafe extern "C" fn asynchttp_next_command(
    client: *mut AsyncHttpClientHandle,
    out: *mut AsyncHttpCommand,
) -> c_int {
    let (Some(handle), Some(out)) = (idle_handle(client), out.as_mut()) else {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    };
    *out = AsyncHttpCommand {
        kind: ASYNCHTTP_COMMAND_NONE,
        host: ptr::null(),
        port: 0,
        data: ptr::null(),
        len: 0,
    };
    handle.current_host = None;
    handle.current = handle.client.transport_mut().next_command();
    match &handle.current {
        None => {}
        Some(TransportCommand::Connect(destination)) => {
            let host = match &destination.host {
                Host::Name(name) => cstring(name),
                Host::Address(ip) => cstring(&ip.to_string()),
            };
            out.kind = ASYNCHTTP_COMMAND_CONNECT;
            out.host = host.as_ptr();
            out.port = destination.port;
            handle.current_host = Some(host);
        }
        Some(TransportCommand::Send(data)) => {
            out.kind = ASYNCHTTP_COMMAND_SEND;
            out.data = data.as_ptr();
            out.len = data.len();
        }
        Some(TransportCommand::Close) => out.kind = ASYNCHTTP_COMMAND_CLOSE,
    }
    out.kind
}

/// Host reports: connection established.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_transport_connected(client: *mut AsyncHttpClientHandle) {
    dispatch(client, |c| {
        c.transport_mut().set_connected(true);
        c.handle_connect();
    });
}

/// Host reports: bytes received.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_transport_data(
    client: *mut AsyncHttpClientHandle,
    data: *const u8,
    len: size_t,
) {
    if data.is_null() || len == 0 {
        return;
    }
    let data = std::slice::from_raw_parts(data, len);
    dispatch(client, |c| c.handle_data(data));
}

/// Host reports: connection closed.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_transport_disconnected(client: *mut AsyncHttpClientHandle) {
    dispatch(client, |c| {
        c.transport_mut().set_connected(false);
        c.handle_disconnect();
    });
}

/// Host reports: no activity for elapsed_ms.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_transport_timeout(client: *mut AsyncHttpClientHandle, elapsed_ms: u64) {
    dispatch(client, |c| c.handle_timeout(Duration::from_millis(elapsed_ms)));
}

/// Host reports: transport error with the host's own code.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_transport_error(client: *mut AsyncHttpClientHandle, code: c_int) {
    dispatch(client, |c| c.handle_error(code));
}

/// Perform the pending request over TCP, blocking until the attempt terminates.
/// Issue asynchttp_client_get/post first. Returns the final ASYNCHTTP_STATE_*,
/// or ASYNCHTTP_ERROR_INVALID_ARGUMENT.
#[no_mangle]
pub unsafe extern "C" fn asynchttp_client_run(client: *mut AsyncHttpClientHandle) -> c_int {
    let (Some(handle), Some(rt)) = (idle_handle(client), runtime()) else {
        return ASYNCHTTP_ERROR_INVALID_ARGUMENT;
    };
    handle.current = None;
    handle.current_host = None;
    let state = dispatch(client, |c| rt.block_on(TcpDriver::new().run(c)));
    state.map(state_code).unwrap_or(ASYNCHTTP_ERROR_INVALID_ARGUMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Seen {
        status: c_int,
        content_type: Option<String>,
        content_length: i64,
        body: Vec<u8>,
        errors: Vec<c_int>,
        completed: Option<(u64, i64)>,
    }

    extern "C" fn on_response(status: c_int, _reason: *const c_char, ct: *const c_char, cl: i64, ud: *mut c_void) {
        let seen = unsafe { &mut *(ud as *mut Seen) };
        seen.status = status;
        seen.content_type = unsafe { str_arg(ct) }.map(|s| s.to_string());
        seen.content_length = cl;
    }

    extern "C" fn on_data(data: *const u8, len: size_t, ud: *mut c_void) {
        let seen = unsafe { &mut *(ud as *mut Seen) };
        seen.body.extend_from_slice(unsafe { std::slice::from_raw_parts(data, len) });
    }

    extern "C" fn on_error(code: c_int, _message: *const c_char, ud: *mut c_void) {
        let seen = unsafe { &mut *(ud as *mut Seen) };
        seen.errors.push(code);
    }

    extern "C" fn on_complete(body_bytes: u64, cl: i64, ud: *mut c_void) {
        let seen = unsafe { &mut *(ud as *mut Seen) };
        seen.completed = Some((body_bytes, cl));
    }

    unsafe fn register(client: *mut AsyncHttpClientHandle, seen: &mut Seen) {
        let ud = seen as *mut Seen as *mut c_void;
        asynchttp_client_on_response(client, Some(on_response), ud);
        asynchttp_client_on_data(client, Some(on_data), ud);
        asynchttp_client_on_error(client, Some(on_error), ud);
        asynchttp_client_on_complete(client, Some(on_complete), ud);
    }

    fn empty_command() -> AsyncHttpCommand {
        AsyncHttpCommand {
            kind: -1,
            host: ptr::null(),
            port: 0,
            data: ptr::null(),
            len: 0,
        }
    }

    #[test]
    fn host_driven_get() {
        let mut seen = Seen::default();
        unsafe {
            let host = CString::new("example.com").unwrap();
            let client = asynchttp_client_new(host.as_ptr(), 80);
            assert!(!client.is_null());
            register(client, &mut seen);

            let path = CString::new("/status").unwrap();
            assert_eq!(asynchttp_client_get(client, path.as_ptr()), 0);
            assert_eq!(
                asynchttp_client_get(client, path.as_ptr()),
                ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT
            );

            let mut cmd = empty_command();
            assert_eq!(asynchttp_next_command(client, &mut cmd), ASYNCHTTP_COMMAND_CONNECT);
            assert_eq!(str_arg(cmd.host), Some("example.com"));
            assert_eq!(cmd.port, 80);
            assert_eq!(asynchttp_next_command(client, &mut cmd), ASYNCHTTP_COMMAND_NONE);

            asynchttp_transport_connected(client);
            assert_eq!(asynchttp_next_command(client, &mut cmd), ASYNCHTTP_COMMAND_SEND);
            let sent = std::slice::from_raw_parts(cmd.data, cmd.len);
            assert_eq!(sent, b"GET /status HTTP/1.1\r\nHost: example.com\r\n\r\n");

            for chunk in [&b"HTTP/1.1 200 OK\r\nContent-Ty"[..], b"pe: text/plain\r\n\r\nhel", b"lo"] {
                asynchttp_transport_data(client, chunk.as_ptr(), chunk.len());
            }
            assert_eq!(asynchttp_client_state(client), ASYNCHTTP_STATE_STREAMING_BODY);
            assert_eq!(asynchttp_client_body_bytes(client), 5);
            asynchttp_transport_disconnected(client);
            assert_eq!(asynchttp_client_state(client), ASYNCHTTP_STATE_CLOSED);
            asynchttp_client_free(client);
        }
        assert_eq!(seen.status, 200);
        assert_eq!(seen.body, b"hello");
        assert_eq!(seen.completed, Some((5, -1)));
    }

    fn seen_after_get() -> Seen {
        let mut seen = Seen::default();
        unsafe {
            let host = CString::new("example.com").unwrap();
            let client = asynchttp_client_new(host.as_ptr(), 80);
            register(client, &mut seen);
            let path = CString::new("/").unwrap();
            asynchttp_client_get(client, path.as_ptr());
            asynchttp_transport_connected(client);
            let wire = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello";
            asynchttp_transport_data(client, wire.as_ptr(), wire.len());
            asynchttp_transport_disconnected(client);
            asynchttp_client_free(client);
        }
        seen
    }

    #[test]
    fn callbacks_receive_response_body_and_completion() {
        let seen = seen_after_get();
        assert_eq!(seen.status, 200);
        assert_eq!(seen.content_type.as_deref(), Some("text/plain"));
        assert_eq!(seen.content_length, 5);
        assert_eq!(seen.body, b"hello");
        assert_eq!(seen.completed, Some((5, 5)));
        assert!(seen.errors.is_empty());
    }

    #[test]
    fn post_copies_body_and_timeout_reports_error() {
        let mut seen = Seen::default();
        unsafe {
            let addr = CString::new("127.0.0.1").unwrap();
            let client = asynchttp_client_new_address(addr.as_ptr(), 8080);
            assert!(!client.is_null());
            register(client, &mut seen);
            asynchttp_transport_connected(client);

            let path = CString::new("/x").unwrap();
            let ct = CString::new("application/json").unwrap();
            let body = b"{\"a\":1}";
            assert_eq!(
                asynchttp_client_post(client, path.as_ptr(), ct.as_ptr(), body.as_ptr(), body.len()),
                0
            );
            let mut cmd = empty_command();
            assert_eq!(asynchttp_next_command(client, &mut cmd), ASYNCHTTP_COMMAND_SEND);
            let sent = std::slice::from_raw_parts(cmd.data, cmd.len);
            assert!(sent.starts_with(b"POST /x HTTP/1.1\r\nHost: 127.0.0.1:8080\r\n"));
            assert!(sent.ends_with(b"Content-Length: 7\r\n\r\n{\"a\":1}"));

            asynchttp_transport_timeout(client, 5000);
            assert_eq!(asynchttp_client_state(client), ASYNCHTTP_STATE_TIMED_OUT);
            asynchttp_client_free(client);
        }
        assert_eq!(seen.errors, vec![-2]);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        unsafe {
            assert!(asynchttp_client_new(ptr::null(), 80).is_null());
            let bad = CString::new("not-an-ip").unwrap();
            assert!(asynchttp_client_new_address(bad.as_ptr(), 80).is_null());
            let path = CString::new("/").unwrap();
            assert_eq!(
                asynchttp_client_get(ptr::null_mut(), path.as_ptr()),
                ASYNCHTTP_ERROR_INVALID_ARGUMENT
            );
            let host = CString::new("h").unwrap();
            let client = asynchttp_client_new(host.as_ptr(), 80);
            assert_eq!(
                asynchttp_client_post(client, path.as_ptr(), path.as_ptr(), ptr::null(), 3),
                ASYNCHTTP_ERROR_INVALID_ARGUMENT
            );
            assert_eq!(asynchttp_client_state(client), ASYNCHTTP_STATE_IDLE);
            asynchttp_client_free(client);
            asynchttp_client_free(ptr::null_mut());
        }
    }

    struct Reentrant {
        client: *mut AsyncHttpClientHandle,
        errors: usize,
        get_rc: c_int,
        state_rc: c_int,
    }

    extern "C" fn retry_on_error(_code: c_int, _message: *const c_char, ud: *mut c_void) {
        let r = unsafe { &mut *(ud as *mut Reentrant) };
        r.errors += 1;
        unsafe {
            r.get_rc = asynchttp_client_get(r.client, b"/retry\0".as_ptr() as *const c_char);
            r.state_rc = asynchttp_client_state(r.client);
            asynchttp_client_on_error(r.client, None, ptr::null_mut());
            asynchttp_transport_disconnected(r.client);
            asynchttp_client_free(r.client);
        }
    }

    #[test]
    fn calls_from_inside_a_callback_are_refused() {
        let host = CString::new("example.com").unwrap();
        let path = CString::new("/").unwrap();
        let mut r = Reentrant {
            client: ptr::null_mut(),
            errors: 0,
            get_rc: 0,
            state_rc: 0,
        };
        unsafe {
            let client = asynchttp_client_new(host.as_ptr(), 80);
            r.client = client;
            let ud = &mut r as *mut Reentrant as *mut c_void;
            asynchttp_client_on_error(client, Some(retry_on_error), ud);

            assert_eq!(asynchttp_client_get(client, path.as_ptr()), 0);
            asynchttp_transport_timeout(client, 1000);
            assert_eq!(asynchttp_client_state(client), ASYNCHTTP_STATE_TIMED_OUT);

            // The handler survived its own attempt to clear itself.
            assert_eq!(asynchttp_client_get(client, path.as_ptr()), 0);
            asynchttp_transport_timeout(client, 1000);
            asynchttp_client_free(client);
        }
        assert_eq!(r.errors, 2);
        assert_eq!(r.get_rc, ASYNCHTTP_ERROR_REQUEST_IN_FLIGHT);
        assert_eq!(r.state_rc, ASYNCHTTP_ERROR_INVALID_ARGUMENT);
    }
}
