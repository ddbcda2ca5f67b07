/*
 * error.rs
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

//! POP3 client errors.
//!
//! A `-ERR` reply from the server is not an error: it comes back as a
//! [`Reply`](super::Reply) value. Only transport, framing and local usage
//! failures end up here.

use std::io;

use thiserror::Error;

use super::SessionState;

#[derive(Debug, Error)]
pub enum Pop3Error {
    /// TCP dial failed.
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// TLS handshake failed after the TCP dial succeeded.
    #[error("TLS handshake with {address} failed: {source}")]
    Tls {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    /// The greeting did not start with `+OK`.
    #[error("server greeting rejected: {0}")]
    GreetingRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// A status line carrying neither `+OK` nor `-ERR`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("session is not connected")]
    NotConnected,

    /// Only raised when strict state checking is enabled.
    #[error("{command} not allowed in {state:?} state")]
    WrongState {
        command: &'static str,
        state: SessionState,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Pop3Error>;
