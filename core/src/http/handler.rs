/*
 * handler.rs
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

//! Caller-facing event slots.
//!
//! Events: response (headers complete) → data (×n) → complete, or error.
//! Each slot holds at most one handler; registering again replaces it, and
//! firing an empty slot does nothing.

use crate::error::HttpError;
use crate::http::response::{Completion, Response};

pub type ResponseHandler = Box<dyn FnMut(&Response)>;
/// Body chunk exactly as delivered by the transport. Valid only for the call.
pub type DataHandler = Box<dyn FnMut(&[u8])>;
pub type ErrorHandler = Box<dyn FnMut(&HttpError)>;
pub type CompleteHandler = Box<dyn FnMut(&Completion)>;

#[derive(Default)]
pub struct Callbacks {
    response: Option<ResponseHandler>,
    data: Option<DataHandler>,
    error: Option<ErrorHandler>,
    complete: Option<CompleteHandler>,
}

impl Callbacks {
    pub fn set_response(&mut self, handler: ResponseHandler) {
        self.response = Some(handler);
    }

    pub fn set_data(&mut self, handler: DataHandler) {
        self.data = Some(handler);
    }

    pub fn set_error(&mut self, handler: ErrorHandler) {
        self.error = Some(handler);
    }

    pub fn set_complete(&mut self, handler: CompleteHandler) {
        self.complete = Some(handler);
    }

    pub(crate) fn response(&mut self, response: &Response) {
        if let Some(h) = self.response.as_mut() {
            h(response);
        }
    }

    pub(crate) fn data(&mut self, chunk: &[u8]) {
        if let Some(h) = self.data.as_mut() {
            h(chunk);
        }
    }

    pub(crate) fn error(&mut self, error: &HttpError) {
        if let Some(h) = self.error.as_mut() {
            h(error);
        }
    }

    pub(crate) fn complete(&mut self, completion: &Completion) {
        if let Some(h) = self.complete.as_mut() {
            h(completion);
        }
    }
}
