/*
 * mod.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of pop3_core, the POP3 client engine of Tagliacarte.
 *
 * pop3_core is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pop3_core is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pop3_core.  If not, see <http://www.gnu.org/licenses/>.
 */

//! POP3 client (RFC 1939): session engine, response framing, observers.

pub mod client;
pub mod error;
pub mod observer;
pub mod response;

pub use client::{Pop3Session, SessionState};
pub use error::{Pop3Error, Result};
pub use observer::{NoopObserver, SessionObserver, TracingObserver};
pub use response::{
    LineBuffer, ListEntry, MultiLine, Reply, Response, StatResponse, Status, ERR,
    MAX_LINE_LENGTH, OK, TERMINATOR,
};
